//! Domain entities and business rules

pub mod binding;
pub mod config;
pub mod device;
pub mod fingerprint;
pub mod fuzzy;
pub mod registry;
pub mod resolver;
pub mod scan;

// Re-export specific items to avoid ambiguous glob imports
pub use binding::{BindingError, BindingState, DeviceBinding, RunningStream, StreamLauncher};
pub use config::{ConfigError, ConfigManager, DeviceConfig, DeviceEntry, PlayerConfig, DEFAULT_BLACKLIST};
pub use device::{
    AudioAddress, AudioDevice, CompositeDevice, Device, DeviceEnumerator, DeviceError,
    DeviceKind, HardwareSnapshot, IconRef, IdentityKey, RawAudioCard, VideoDevice, VideoGroup,
};
pub use fingerprint::{FingerprintRule, FingerprintTable, MatchField, RuleKind};
pub use fuzzy::{fuzzy_match, MatchStrategy};
pub use registry::{reconcile, resolve_entry, CanonicalDeviceSet, DeviceRegistry, DeviceSummary, SummaryEntry};
pub use resolver::{MatchCandidate, MatchSettings, Resolver, DEFAULT_VIDEO_QUERY};
pub use scan::{scan_audio_devices, scan_devices, scan_video_devices, DeviceScan};
