//! V4L2 video group enumeration
//!
//! Parses `v4l2-ctl --list-devices`: a header line per device group followed
//! by its indented `/dev/` nodes.
//!
//! ```text
//! USB Camera-B4.09.24.1 (usb-3f980000.usb-1.2):
//!         /dev/video0
//!         /dev/video1
//! ```

use tracing::{debug, trace};

use analog_media_core::domain::device::{Result, VideoGroup};

use crate::tools::run_tool;

/// Enumerates video groups with `v4l2-ctl --list-devices`
#[derive(Debug, Clone)]
pub struct V4l2CtlEnumerator {
    program: String,
}

impl Default for V4l2CtlEnumerator {
    fn default() -> Self {
        Self::new("v4l2-ctl")
    }
}

impl V4l2CtlEnumerator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn video_groups(&self) -> Result<Vec<VideoGroup>> {
        let listing = run_tool(&self.program, &["--list-devices"])?;
        let groups = parse_v4l2_list(&listing);
        debug!(count = groups.len(), "Found video groups");
        Ok(groups)
    }
}

/// Parse a device listing into groups, preserving order
///
/// Node lines seen before any header are ignored.
pub fn parse_v4l2_list(listing: &str) -> Vec<VideoGroup> {
    let mut groups: Vec<VideoGroup> = Vec::new();

    for line in listing.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if line.starts_with("/dev/") {
            match groups.last_mut() {
                Some(group) => group.nodes.push(line.to_string()),
                None => trace!(line, "Node without a group header"),
            }
        } else if line.contains(':') {
            let name = line.strip_suffix(':').unwrap_or(line);
            groups.push(VideoGroup::new(name, Vec::<String>::new()));
        } else {
            trace!(line, "Skipping unrecognized v4l2-ctl line");
        }
    }

    groups
}
