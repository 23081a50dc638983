//! Reconciliation of configured and discovered devices
//!
//! User-declared devices are resolved first and always win. Scan results are
//! added afterwards when their identity is new and their display name is not
//! blacklisted.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::config::{DeviceConfig, DeviceEntry};
use super::device::{
    AudioDevice, CompositeDevice, Device, DeviceEnumerator, DeviceError, HardwareSnapshot,
    IconRef, IdentityKey, Result, VideoDevice,
};
use super::fingerprint::FingerprintTable;
use super::resolver::Resolver;
use super::scan::scan_devices;

/// Ordered device collection without duplicate identities
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalDeviceSet {
    devices: Vec<Device>,
    keys: HashSet<IdentityKey>,
}

impl CanonicalDeviceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the identity is already present; returns whether it was added
    pub fn insert(&mut self, device: Device) -> bool {
        if !self.keys.insert(device.identity()) {
            return false;
        }
        self.devices.push(device);
        true
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.keys.contains(key)
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&Device> {
        self.devices.iter().find(|d| d.identity() == *key)
    }

    /// First device with the given display name
    pub fn find_by_name(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.display_name() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Device> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Flattened projection keyed by display name
    pub fn summary(&self) -> DeviceSummary {
        let mut summary = DeviceSummary::default();
        for device in &self.devices {
            summary.insert(device.display_name().to_string(), SummaryEntry::from(device));
        }
        summary
    }

    pub fn into_vec(self) -> Vec<Device> {
        self.devices
    }
}

impl IntoIterator for CanonicalDeviceSet {
    type Item = Device;
    type IntoIter = std::vec::IntoIter<Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.into_iter()
    }
}

impl<'a> IntoIterator for &'a CanonicalDeviceSet {
    type Item = &'a Device;
    type IntoIter = std::slice::Iter<'a, Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}

/// Serializable view of one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub icon: IconRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_address: Option<String>,
}

impl From<&Device> for SummaryEntry {
    fn from(device: &Device) -> Self {
        match device {
            Device::Audio(d) => Self {
                icon: d.icon.clone(),
                audio_address: Some(d.address.to_string()),
                video_address: None,
            },
            Device::Video(d) => Self {
                icon: d.icon.clone(),
                audio_address: None,
                video_address: Some(d.node.clone()),
            },
            Device::Composite(d) => Self {
                icon: d.icon.clone(),
                audio_address: Some(d.audio.address.to_string()),
                video_address: Some(d.video.node.clone()),
            },
        }
    }
}

/// Display name to [`SummaryEntry`] mapping, serialized as a JSON object in
/// device order
///
/// A repeated display name keeps its first position and takes the later entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSummary {
    entries: Vec<(String, SummaryEntry)>,
}

impl DeviceSummary {
    fn insert(&mut self, name: String, entry: SummaryEntry) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((name, entry)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SummaryEntry> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SummaryEntry)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e))
    }

    /// Rewrite every icon, e.g. to resolve names into file paths
    pub fn map_icons<F>(mut self, mut f: F) -> Self
    where
        F: FnMut(&IconRef) -> IconRef,
    {
        for (_, entry) in &mut self.entries {
            entry.icon = f(&entry.icon);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for DeviceSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

/// Resolve a configured entry into a device named after the entry
pub fn resolve_entry(resolver: &Resolver<'_>, entry: &DeviceEntry) -> Result<Device> {
    if entry.name.trim().is_empty() {
        return Err(DeviceError::InvalidConfiguration("device without a name".to_string()));
    }
    let icon = entry.icon_or_default();

    match (entry.audio_query(), entry.video_query()) {
        (Some(a), Some(v)) => {
            let audio = resolver.resolve_audio_device(Some(a))?;
            let video = resolver.resolve_video_device(Some(v))?;
            Ok(CompositeDevice::new(audio, video, &entry.name, icon).into())
        }
        (Some(a), None) => Ok(AudioDevice {
            display_name: entry.name.clone(),
            icon,
            ..resolver.resolve_audio_device(Some(a))?
        }
        .into()),
        (None, Some(v)) => Ok(VideoDevice {
            display_name: entry.name.clone(),
            icon,
            ..resolver.resolve_video_device(Some(v))?
        }
        .into()),
        (None, None) => Err(DeviceError::InvalidConfiguration(format!(
            "{} declares neither audio_device nor video_device",
            entry.name
        ))),
    }
}

/// Build the canonical set from one snapshot
///
/// Configured devices that fail to resolve are skipped with a warning.
pub fn reconcile(
    snapshot: &HardwareSnapshot,
    fingerprints: &FingerprintTable,
    config: &DeviceConfig,
) -> CanonicalDeviceSet {
    let resolver = Resolver::new(snapshot, config.matching);
    let mut devices = CanonicalDeviceSet::new();

    if config.devices.is_empty() {
        debug!("No analog devices configured");
    }
    for entry in &config.devices {
        match resolve_entry(&resolver, entry) {
            Ok(device) => {
                let key = device.identity();
                if !devices.insert(device) {
                    warn!(name = %entry.name, identity = %key, "Configured device duplicates an earlier entry");
                }
            }
            Err(e) => warn!(name = %entry.name, error = %e, "Failed to load configured device"),
        }
    }

    let blacklist = config.blacklist();
    for device in scan_devices(snapshot, fingerprints) {
        if blacklist.iter().any(|b| b == device.display_name()) {
            debug!(name = device.display_name(), "Skipping blacklisted device");
            continue;
        }
        devices.insert(device);
    }

    devices
}

/// Entry point combining enumeration, scan and reconciliation
pub struct DeviceRegistry<E> {
    enumerator: E,
    fingerprints: FingerprintTable,
}

impl<E: DeviceEnumerator> DeviceRegistry<E> {
    /// Registry using the built-in fingerprint table
    pub fn new(enumerator: E) -> Self {
        Self {
            enumerator,
            fingerprints: FingerprintTable::builtin(),
        }
    }

    pub fn with_fingerprints(mut self, fingerprints: FingerprintTable) -> Self {
        self.fingerprints = fingerprints;
        self
    }

    pub fn enumerator(&self) -> &E {
        &self.enumerator
    }

    /// Capture a fresh enumeration snapshot
    pub fn snapshot(&self) -> HardwareSnapshot {
        HardwareSnapshot::capture(&self.enumerator)
    }

    /// Effective table: configured fingerprints ahead of the registry's own
    pub fn fingerprints_for(&self, config: &DeviceConfig) -> FingerprintTable {
        self.fingerprints.clone().with_overrides(config.fingerprints.iter().cloned())
    }

    /// Enumerate, scan and reconcile against `config`
    pub fn get_devices(&self, config: &DeviceConfig) -> CanonicalDeviceSet {
        let snapshot = self.snapshot();
        let devices = reconcile(&snapshot, &self.fingerprints_for(config), config);
        info!(count = devices.len(), "Discovered analog devices");
        devices
    }

    pub fn get_device_summary(&self, config: &DeviceConfig) -> DeviceSummary {
        self.get_devices(config).summary()
    }
}
