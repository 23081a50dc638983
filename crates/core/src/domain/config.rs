//! Configuration management for analog media devices
//!
//! This module provides:
//! - User-declared devices, the blacklist and scoring overrides
//! - TOML loading and saving
//! - A manager for the default `~/.config/analog-media/config.toml` location

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use super::device::{DeviceError, IconRef};
use super::fingerprint::FingerprintRule;
use super::resolver::MatchSettings;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Devices filtered out of scan results when the configuration names none
pub const DEFAULT_BLACKLIST: [&str; 2] = ["bcm2835-isp", "bcm2835-codec-decode"];

/// Errors that can occur during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for DeviceError {
    fn from(e: ConfigError) -> Self {
        DeviceError::ConfigurationUnavailable(e.to_string())
    }
}

/// A user-declared device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub name: String,

    /// Free-text audio card query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_device: Option<String>,

    /// Free-text video query, e.g. `video0` or a group name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_device: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl DeviceEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            audio_device: None,
            video_device: None,
            icon: None,
        }
    }

    pub fn with_audio(mut self, query: impl Into<String>) -> Self {
        self.audio_device = Some(query.into());
        self
    }

    pub fn with_video(mut self, query: impl Into<String>) -> Self {
        self.video_device = Some(query.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Configured icon, or the default for the modalities declared
    pub fn icon_or_default(&self) -> IconRef {
        if let Some(icon) = &self.icon {
            return IconRef::new(icon.clone());
        }
        match (self.audio_query(), self.video_query()) {
            (Some(_), Some(_)) => IconRef::new(IconRef::RCA),
            (None, Some(_)) => IconRef::new(IconRef::CAMERA),
            _ => IconRef::new(IconRef::SOUNDCARD),
        }
    }

    /// Audio query, treating a blank one as absent
    pub fn audio_query(&self) -> Option<&str> {
        non_blank(self.audio_device.as_deref())
    }

    /// Video query, treating a blank one as absent
    pub fn video_query(&self) -> Option<&str> {
        non_blank(self.video_device.as_deref())
    }
}

fn non_blank(query: Option<&str>) -> Option<&str> {
    query.filter(|q| !q.trim().is_empty())
}

/// External player settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// `auto`, a known player name, or an executable
    pub video: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            video: "auto".to_string(),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Display names excluded from scan results; `None` selects the default list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blacklist: Option<Vec<String>>,

    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default)]
    pub matching: MatchSettings,

    /// Extra fingerprints, evaluated before the built-in table
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fingerprints: Vec<FingerprintRule>,

    /// User-declared devices in priority order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<DeviceEntry>,
}

impl DeviceConfig {
    /// Effective blacklist; an absent or empty list selects the default one
    pub fn blacklist(&self) -> Vec<String> {
        match &self.blacklist {
            Some(list) if !list.is_empty() => list.clone(),
            _ => DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    #[instrument(skip(path))]
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = fs::read_to_string(path).await?;
        let config = Self::from_toml_str(&contents)?;

        debug!(devices = config.devices.len(), "Configuration loaded successfully");
        Ok(config)
    }

    /// Save configuration to TOML file
    #[instrument(skip(self, path))]
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), "Saving configuration");

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str).await?;

        debug!("Configuration saved successfully");
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let m = &self.matching;
        if !(0.0..=1.0).contains(&m.acceptance_threshold) {
            return Err(ConfigError::Invalid(format!(
                "acceptance_threshold out of range: {}",
                m.acceptance_threshold
            )));
        }
        Ok(())
    }

    /// Commented example configuration
    pub fn template() -> &'static str {
        r#"# Analog media device configuration

# Display names hidden from scan results. Omit to use the built-in list.
# blacklist = ["bcm2835-isp", "bcm2835-codec-decode"]

[player]
# auto picks the first of mpv, vlc, mplayer found on PATH
video = "auto"

[matching]
acceptance_threshold = 0.75
name_weight = 0.9
type_weight = 0.1
usb_bonus = 0.1
analog_penalty = 0.1

# [[fingerprints]]
# alias = "Capture Stick"
# type = "video"
# icon = "camera.png"
# match_fields = { device_name = "UVC Camera" }

# [[devices]]
# name = "VCR"
# audio_device = "USB Audio"
# video_device = "video0"
# icon = "rca.png"
"#
    }
}

/// Configuration manager for the main config file
///
/// Manages the configuration file at `~/.config/analog-media/config.toml`.
pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a manager for `config.toml` inside `config_dir`
    pub fn new(config_dir: PathBuf) -> Self {
        let config_path = config_dir.join("config.toml");
        Self {
            config_dir,
            config_path,
        }
    }

    /// Manage an explicit file path
    pub fn with_path(config_path: PathBuf) -> Self {
        let config_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            config_dir,
            config_path,
        }
    }

    /// Get the default config directory path
    ///
    /// Returns `~/.config/analog-media` on Linux
    pub fn default_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("analog-media"))
            .ok_or_else(|| ConfigError::Invalid("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration, reporting why it is unavailable
    pub async fn try_load(&self) -> std::result::Result<DeviceConfig, DeviceError> {
        if !self.config_path.exists() {
            return Err(DeviceError::ConfigurationUnavailable(format!(
                "{} does not exist",
                self.config_path.display()
            )));
        }
        Ok(DeviceConfig::load_from_file(&self.config_path).await?)
    }

    /// Load configuration
    ///
    /// A missing or unreadable file yields the default configuration, which
    /// declares no devices and uses the built-in blacklist.
    #[instrument(skip(self))]
    pub async fn load(&self) -> DeviceConfig {
        match self.try_load().await {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    path = %self.config_path.display(),
                    error = %e,
                    "No analog devices configured, using defaults"
                );
                DeviceConfig::default()
            }
        }
    }

    /// Save configuration to file
    #[instrument(skip(self, config))]
    pub async fn save(&self, config: &DeviceConfig) -> Result<()> {
        fs::create_dir_all(&self.config_dir).await?;
        config.save_to_file(&self.config_path).await
    }

    /// Check if config file exists
    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }
}
