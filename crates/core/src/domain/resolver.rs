//! Identity resolution of free-text device queries
//!
//! A query such as `"USB Soundcard"` or `"video0"` is scored against every
//! entry of a [`HardwareSnapshot`]; the best candidate is accepted only when it
//! reaches the acceptance threshold.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::device::{
    AudioAddress, AudioDevice, DeviceError, HardwareSnapshot, IconRef, RawAudioCard, Result,
    VideoDevice, VideoGroup,
};
use super::fuzzy::{self, MatchStrategy};

/// Query used when a video device is requested without one
pub const DEFAULT_VIDEO_QUERY: &str = "video0";

/// Tuned scoring constants
///
/// The weights and the threshold are empirical; they are kept overridable
/// rather than re-derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    /// Minimum score for a resolution to succeed
    pub acceptance_threshold: f64,
    /// Weight of the card name similarity
    pub name_weight: f64,
    /// Weight of the type tag similarity when it is neither USB nor analog
    pub type_weight: f64,
    /// Added when the type tag mentions USB
    pub usb_bonus: f64,
    /// Subtracted when the type tag mentions analog
    pub analog_penalty: f64,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.75,
            name_weight: 0.9,
            type_weight: 0.1,
            usb_bonus: 0.1,
            analog_penalty: 0.1,
        }
    }
}

/// A scored candidate, transient output of a lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchCandidate<T> {
    pub target: T,
    pub score: f64,
}

/// Resolves queries against one enumeration snapshot
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    snapshot: &'a HardwareSnapshot,
    settings: MatchSettings,
}

impl<'a> Resolver<'a> {
    pub fn new(snapshot: &'a HardwareSnapshot, settings: MatchSettings) -> Self {
        Self { snapshot, settings }
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Rank every audio card against `query`, best first
    pub fn find_audio_device(&self, query: &str) -> Vec<MatchCandidate<&'a RawAudioCard>> {
        let mut matches: Vec<_> = self
            .snapshot
            .audio_cards
            .iter()
            .map(|card| MatchCandidate {
                target: card,
                score: self.score_audio_card(query, card),
            })
            .collect();
        sort_by_score(&mut matches);
        matches
    }

    /// Bind `query` to an audio card
    ///
    /// Without a query the default card `hw:0,0` is used as is.
    pub fn resolve_audio_device(&self, query: Option<&str>) -> Result<AudioDevice> {
        let Some(query) = query else {
            let address = AudioAddress::default();
            let name = self
                .snapshot
                .audio_cards
                .iter()
                .find(|card| card.address() == address)
                .map(|card| card.name.clone())
                .unwrap_or_else(|| address.to_string());
            return Ok(AudioDevice::new(address, name, IconRef::new(IconRef::MIC)));
        };

        let best = self.find_audio_device(query).into_iter().next();
        match best {
            Some(candidate) if candidate.score >= self.settings.acceptance_threshold => {
                let card = candidate.target;
                debug!(query, card = %card.address(), score = candidate.score, "Resolved audio device");
                Ok(AudioDevice::new(card.address(), card.name.clone(), IconRef::new(IconRef::MIC)))
            }
            other => Err(DeviceError::DeviceNotFound {
                query: query.to_string(),
                best_score: other.map(|c| c.score).unwrap_or(0.0),
            }),
        }
    }

    /// Rank every video group against `query`, best first
    pub fn find_video_device(&self, query: &str) -> Vec<MatchCandidate<&'a VideoGroup>> {
        let path_query = if query.starts_with("/dev/") {
            query.to_string()
        } else {
            format!("/dev/{}", query)
        };

        let mut matches: Vec<_> = self
            .snapshot
            .video_groups
            .iter()
            .map(|group| {
                let name_score = fuzzy::score(query, &group.name);
                let path_score = fuzzy::best_match(
                    &path_query,
                    group.nodes.iter().map(String::as_str),
                    MatchStrategy::Simple,
                )
                .map(|(_, s)| s)
                .unwrap_or(0.0);
                MatchCandidate {
                    target: group,
                    score: name_score.max(path_score),
                }
            })
            .collect();
        sort_by_score(&mut matches);
        matches
    }

    /// Bind `query` to the canonical node of the best video group
    pub fn resolve_video_device(&self, query: Option<&str>) -> Result<VideoDevice> {
        let query = query.unwrap_or(DEFAULT_VIDEO_QUERY);
        let best = self.find_video_device(query).into_iter().next();
        match best {
            Some(candidate) if candidate.score >= self.settings.acceptance_threshold => {
                let group = candidate.target;
                let node = group.canonical_node().ok_or_else(|| DeviceError::DeviceNotFound {
                    query: query.to_string(),
                    best_score: candidate.score,
                })?;
                debug!(query, node, score = candidate.score, "Resolved video device");
                Ok(VideoDevice::new(node, group.alias(), IconRef::new(IconRef::CAMERA)))
            }
            other => Err(DeviceError::DeviceNotFound {
                query: query.to_string(),
                best_score: other.map(|c| c.score).unwrap_or(0.0),
            }),
        }
    }

    fn score_audio_card(&self, query: &str, card: &RawAudioCard) -> f64 {
        let s = &self.settings;
        let mut score = fuzzy::score(query, &card.name) * s.name_weight;
        let type_tag = card.type_tag.to_lowercase();
        if type_tag.contains("usb") {
            score += s.usb_bonus;
        } else if type_tag.contains("analog") {
            score -= s.analog_penalty;
        } else {
            score += fuzzy::ratio(query, &card.type_tag) * s.type_weight;
        }
        score
    }
}

/// Descending by score; `sort_by` is stable so ties keep enumeration order
fn sort_by_score<T>(matches: &mut [MatchCandidate<T>]) {
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
}
