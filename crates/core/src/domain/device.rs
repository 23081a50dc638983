//! Device identities and raw enumeration data
//!
//! Raw cards and video groups come straight from OS tooling and are never
//! mutated. A resolved [`Device`] carries a hardware address from which its
//! [`IdentityKey`] is derived; display names never take part in identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while discovering or resolving devices
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Best candidate scored below the acceptance threshold
    #[error("Unknown device: {query} (best score {best_score:.2})")]
    DeviceNotFound { query: String, best_score: f64 },

    /// OS enumeration tool missing or produced unusable output
    #[error("Enumeration failed: {0}")]
    EnumerationFailure(String),

    /// Configuration source missing or unreadable
    #[error("Configuration unavailable: {0}")]
    ConfigurationUnavailable(String),

    /// Configuration entry that cannot describe a device
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, DeviceError>;

/// An ALSA capture card as listed by the audio subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAudioCard {
    pub card_index: u32,
    pub sub_device_index: u32,
    pub name: String,
    pub type_tag: String,
}

impl RawAudioCard {
    pub fn new(card_index: u32, sub_device_index: u32, name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            card_index,
            sub_device_index,
            name: name.into(),
            type_tag: type_tag.into(),
        }
    }

    pub fn address(&self) -> AudioAddress {
        AudioAddress::new(self.card_index, self.sub_device_index)
    }
}

/// A video device group and the nodes it exposes, first node is canonical
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoGroup {
    pub name: String,
    pub nodes: Vec<String>,
}

impl VideoGroup {
    pub fn new<I, S>(name: impl Into<String>, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            nodes: nodes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn canonical_node(&self) -> Option<&str> {
        self.nodes.first().map(String::as_str)
    }

    /// Group name without any trailing parenthetical qualifier
    ///
    /// `"USB Camera-B4.09.24.1 (usb-3f980000.usb-1.2)"` becomes
    /// `"USB Camera-B4.09.24.1"`.
    pub fn alias(&self) -> &str {
        match self.name.split_once(" (") {
            Some((head, _)) => head,
            None => &self.name,
        }
    }
}

/// ALSA hardware address, rendered as `hw:<card>,<device>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AudioAddress {
    pub card: u32,
    pub device: u32,
}

impl AudioAddress {
    pub fn new(card: u32, device: u32) -> Self {
        Self { card, device }
    }
}

impl fmt::Display for AudioAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hw:{},{}", self.card, self.device)
    }
}

/// Icon name or path, resolved to a file by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconRef(String);

impl IconRef {
    pub const MIC: &'static str = "mic.png";
    pub const SOUNDCARD: &'static str = "soundcard.png";
    pub const CAMERA: &'static str = "camera.png";
    pub const RCA: &'static str = "rca.png";

    pub fn new(icon: impl Into<String>) -> Self {
        Self(icon.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IconRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deduplication key derived from a device's hardware address
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDevice {
    pub address: AudioAddress,
    pub display_name: String,
    pub icon: IconRef,
}

impl AudioDevice {
    pub fn new(address: AudioAddress, display_name: impl Into<String>, icon: IconRef) -> Self {
        Self {
            address,
            display_name: display_name.into(),
            icon,
        }
    }

    pub fn identity(&self) -> IdentityKey {
        IdentityKey(format!("audio:{}", self.address))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDevice {
    pub node: String,
    pub display_name: String,
    pub icon: IconRef,
}

impl VideoDevice {
    pub fn new(node: impl Into<String>, display_name: impl Into<String>, icon: IconRef) -> Self {
        Self {
            node: node.into(),
            display_name: display_name.into(),
            icon,
        }
    }

    pub fn identity(&self) -> IdentityKey {
        IdentityKey(format!("video:{}", self.node))
    }
}

/// One physical unit exposing both an audio card and a video node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeDevice {
    pub audio: AudioDevice,
    pub video: VideoDevice,
    pub display_name: String,
    pub icon: IconRef,
}

impl CompositeDevice {
    /// Pair two resolved streams; both halves take the composite name and icon
    pub fn new(audio: AudioDevice, video: VideoDevice, display_name: impl Into<String>, icon: IconRef) -> Self {
        let display_name = display_name.into();
        Self {
            audio: AudioDevice {
                display_name: display_name.clone(),
                icon: icon.clone(),
                ..audio
            },
            video: VideoDevice {
                display_name: display_name.clone(),
                icon: icon.clone(),
                ..video
            },
            display_name,
            icon,
        }
    }

    pub fn identity(&self) -> IdentityKey {
        IdentityKey(format!("av:{}+{}", self.audio.address, self.video.node))
    }
}

/// Modality of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Audio,
    Video,
    Composite,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Audio => f.write_str("audio"),
            DeviceKind::Video => f.write_str("video"),
            DeviceKind::Composite => f.write_str("audio+video"),
        }
    }
}

/// A resolved analog device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Device {
    Audio(AudioDevice),
    Video(VideoDevice),
    Composite(CompositeDevice),
}

impl Device {
    pub fn identity(&self) -> IdentityKey {
        match self {
            Device::Audio(d) => d.identity(),
            Device::Video(d) => d.identity(),
            Device::Composite(d) => d.identity(),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Device::Audio(d) => &d.display_name,
            Device::Video(d) => &d.display_name,
            Device::Composite(d) => &d.display_name,
        }
    }

    pub fn icon(&self) -> &IconRef {
        match self {
            Device::Audio(d) => &d.icon,
            Device::Video(d) => &d.icon,
            Device::Composite(d) => &d.icon,
        }
    }

    pub fn kind(&self) -> DeviceKind {
        match self {
            Device::Audio(_) => DeviceKind::Audio,
            Device::Video(_) => DeviceKind::Video,
            Device::Composite(_) => DeviceKind::Composite,
        }
    }

    pub fn audio_address(&self) -> Option<AudioAddress> {
        match self {
            Device::Audio(d) => Some(d.address),
            Device::Composite(d) => Some(d.audio.address),
            Device::Video(_) => None,
        }
    }

    pub fn video_node(&self) -> Option<&str> {
        match self {
            Device::Video(d) => Some(&d.node),
            Device::Composite(d) => Some(&d.video.node),
            Device::Audio(_) => None,
        }
    }
}

impl From<AudioDevice> for Device {
    fn from(d: AudioDevice) -> Self {
        Device::Audio(d)
    }
}

impl From<VideoDevice> for Device {
    fn from(d: VideoDevice) -> Self {
        Device::Video(d)
    }
}

impl From<CompositeDevice> for Device {
    fn from(d: CompositeDevice) -> Self {
        Device::Composite(d)
    }
}

/// Source of raw hardware listings
///
/// Implementations wrap OS tooling (`arecord`, `v4l2-ctl`) and live in the
/// `infra` crate.
pub trait DeviceEnumerator: Send + Sync {
    /// List capture cards in enumeration order
    fn audio_cards(&self) -> Result<Vec<RawAudioCard>>;

    /// List video device groups in enumeration order
    fn video_groups(&self) -> Result<Vec<VideoGroup>>;
}

/// Immutable capture of one enumeration pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HardwareSnapshot {
    pub audio_cards: Vec<RawAudioCard>,
    pub video_groups: Vec<VideoGroup>,
}

impl HardwareSnapshot {
    pub fn new(audio_cards: Vec<RawAudioCard>, video_groups: Vec<VideoGroup>) -> Self {
        Self {
            audio_cards,
            video_groups,
        }
    }

    /// Query the enumerator once per modality
    ///
    /// A failing modality contributes nothing instead of failing the pass.
    pub fn capture(enumerator: &dyn DeviceEnumerator) -> Self {
        let audio_cards = enumerator.audio_cards().unwrap_or_else(|e| {
            warn!(error = %e, "Audio enumeration failed, assuming no audio devices");
            Vec::new()
        });
        let video_groups = enumerator.video_groups().unwrap_or_else(|e| {
            warn!(error = %e, "Video enumeration failed, assuming no video devices");
            Vec::new()
        });
        Self {
            audio_cards,
            video_groups,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.audio_cards.is_empty() && self.video_groups.is_empty()
    }
}
