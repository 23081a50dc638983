//! ALSA capture card enumeration
//!
//! Parses `arecord -l`, whose card lines look like:
//!
//! ```text
//! card 1: Camera [USB Camera-B4.09.24.1], device 0: USB Audio [USB Audio]
//! ```

use tracing::{debug, trace};

use analog_media_core::domain::device::{RawAudioCard, Result};

use crate::tools::run_tool;

/// Enumerates capture cards with `arecord -l`
#[derive(Debug, Clone)]
pub struct ArecordEnumerator {
    program: String,
}

impl Default for ArecordEnumerator {
    fn default() -> Self {
        Self::new("arecord")
    }
}

impl ArecordEnumerator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn audio_cards(&self) -> Result<Vec<RawAudioCard>> {
        let listing = run_tool(&self.program, &["-l"])?;
        let cards = parse_arecord_list(&listing);
        debug!(count = cards.len(), "Found capture cards");
        Ok(cards)
    }
}

/// Parse every card line of an `arecord -l` listing, skipping anything else
pub fn parse_arecord_list(listing: &str) -> Vec<RawAudioCard> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("card "))
        .filter_map(|line| {
            let card = parse_card_line(line);
            if card.is_none() {
                trace!(line, "Skipping malformed arecord line");
            }
            card
        })
        .collect()
}

fn parse_card_line(line: &str) -> Option<RawAudioCard> {
    let rest = line.strip_prefix("card ")?;
    let (card_index, rest) = rest.split_once(": ")?;
    let (name, rest) = rest.split_once(", device ")?;
    let (device_index, type_tag) = rest.split_once(": ")?;
    Some(RawAudioCard::new(
        card_index.trim().parse().ok()?,
        device_index.trim().parse().ok()?,
        name.trim(),
        type_tag.trim(),
    ))
}
