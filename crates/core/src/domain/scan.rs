//! Fingerprint driven scan and composite merge
//!
//! USB composite devices (a camera with a built-in microphone) show up as an
//! unrelated ALSA card and V4L2 group. The only observable link is that ALSA
//! appends the camera group name in brackets to the card's description, e.g.
//! `"USB Camera-B4.09.24.1 [USB Camera-B4.09.24.1]"`. Pairing on that exact
//! suffix misses some hardware but never pairs unrelated devices.
//!
//! All scans are lazy and consume a snapshot; iterating again requires a new
//! scan, it never re-enumerates hardware.

use std::slice;
use std::vec;
use tracing::{debug, trace};

use super::device::{
    AudioDevice, CompositeDevice, Device, HardwareSnapshot, IconRef, VideoDevice, VideoGroup,
};
use super::fingerprint::FingerprintTable;

/// One device per raw audio card, named by the first matching fingerprint
pub fn scan_audio_devices<'a>(
    snapshot: &'a HardwareSnapshot,
    table: &'a FingerprintTable,
) -> impl Iterator<Item = AudioDevice> + 'a {
    snapshot.audio_cards.iter().map(move |card| match table.first_audio_match(card) {
        Some(rule) => {
            trace!(card = %card.address(), alias = %rule.alias, "Audio card matched fingerprint");
            AudioDevice::new(card.address(), rule.alias.clone(), rule.icon.clone())
        }
        None => AudioDevice::new(card.address(), card.name.clone(), IconRef::new(IconRef::MIC)),
    })
}

/// One device per video group that exposes at least one node
pub fn scan_video_devices<'a>(
    snapshot: &'a HardwareSnapshot,
    table: &'a FingerprintTable,
) -> impl Iterator<Item = VideoDevice> + 'a {
    snapshot.video_groups.iter().filter_map(move |group| {
        let node = group.canonical_node()?;
        Some(match table.first_video_match(group) {
            Some(rule) => VideoDevice::new(node, rule.alias.clone(), rule.icon.clone()),
            None => VideoDevice::new(node, group.name.clone(), IconRef::new(IconRef::CAMERA)),
        })
    })
}

/// Full scan with composite merging
pub fn scan_devices<'a>(snapshot: &'a HardwareSnapshot, table: &'a FingerprintTable) -> DeviceScan<'a> {
    DeviceScan::new(snapshot, table)
}

/// Iterator over scanned devices
///
/// Video groups are emitted first, each either standalone or merged with the
/// first unconsumed audio card carrying its bracketed alias; audio cards left
/// over are emitted afterwards in enumeration order.
pub struct DeviceScan<'a> {
    table: &'a FingerprintTable,
    groups: slice::Iter<'a, VideoGroup>,
    audio: Vec<AudioDevice>,
    leftover: Option<vec::IntoIter<AudioDevice>>,
}

impl<'a> DeviceScan<'a> {
    fn new(snapshot: &'a HardwareSnapshot, table: &'a FingerprintTable) -> Self {
        Self {
            table,
            groups: snapshot.video_groups.iter(),
            audio: scan_audio_devices(snapshot, table).collect(),
            leftover: None,
        }
    }

    fn next_video(&mut self) -> Option<Device> {
        for group in self.groups.by_ref() {
            let Some(node) = group.canonical_node() else {
                trace!(group = %group.name, "Skipping video group without nodes");
                continue;
            };

            if let Some(rule) = self.table.first_video_match(group) {
                return Some(VideoDevice::new(node, rule.alias.clone(), rule.icon.clone()).into());
            }

            let alias = group.alias();
            let suffix = format!("[{}]", alias);
            let video = VideoDevice::new(node, alias, IconRef::new(IconRef::CAMERA));

            if let Some(pos) = self.audio.iter().position(|a| a.display_name.ends_with(&suffix)) {
                let audio = self.audio.remove(pos);
                debug!(alias, audio = %audio.address, video = node, "Merged composite device");
                return Some(CompositeDevice::new(audio, video, alias, IconRef::new(IconRef::RCA)).into());
            }

            return Some(video.into());
        }
        None
    }
}

impl Iterator for DeviceScan<'_> {
    type Item = Device;

    fn next(&mut self) -> Option<Device> {
        if self.leftover.is_none() {
            if let Some(device) = self.next_video() {
                return Some(device);
            }
            self.leftover = Some(std::mem::take(&mut self.audio).into_iter());
        }
        self.leftover.as_mut()?.next().map(Device::Audio)
    }
}
