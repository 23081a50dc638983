//! Configuration files driving discovery

use tempfile::TempDir;

use analog_media_core::{
    AudioAddress, ConfigManager, DeviceConfig, DeviceEntry, DeviceError, DeviceKind, DeviceRegistry,
};

use crate::{capture_stick, FixtureEnumerator};

const CONFIG: &str = r#"
blacklist = ["UVC Capture Stick"]

[player]
video = "mpv"

[[fingerprints]]
alias = "Hauppauge Mic"
type = "audio"
icon = "hauppauge.png"
match_fields = { card_name = "USB PnP", card_type = "USB Audio" }

[[devices]]
name = "Cassette Deck"
audio_device = "Stick"

[[devices]]
name = "Security Camera"
video_device = "/dev/video3"
icon = "cctv.png"
"#;

async fn write_config(contents: &str) -> (TempDir, ConfigManager) {
    let dir = TempDir::new().unwrap();
    tokio::fs::write(dir.path().join("config.toml"), contents).await.unwrap();
    let manager = ConfigManager::new(dir.path().to_path_buf());
    (dir, manager)
}

#[tokio::test]
async fn test_config_file_drives_discovery() {
    let (_dir, manager) = write_config(CONFIG).await;
    let config = manager.try_load().await.unwrap();
    assert_eq!(config.player.video, "mpv");

    let registry = DeviceRegistry::new(FixtureEnumerator::new(capture_stick()));
    let devices = registry.get_devices(&config);
    let names: Vec<&str> = devices.iter().map(|d| d.display_name()).collect();

    // Configured entries first, then scan results that survive the blacklist
    assert_eq!(
        names,
        vec!["Cassette Deck", "Security Camera", "bcm2835-isp", "Hauppauge Mic"]
    );

    let deck = devices.find_by_name("Cassette Deck").unwrap();
    assert_eq!(deck.audio_address(), Some(AudioAddress::new(1, 0)));
    assert_eq!(deck.icon().as_str(), "soundcard.png");

    let camera = devices.find_by_name("Security Camera").unwrap();
    assert_eq!(camera.kind(), DeviceKind::Video);
    assert_eq!(camera.video_node(), Some("/dev/video2"));
    assert_eq!(camera.icon().as_str(), "cctv.png");

    let mic = devices.find_by_name("Hauppauge Mic").unwrap();
    assert_eq!(mic.audio_address(), Some(AudioAddress::new(2, 0)));
}

#[tokio::test]
async fn test_missing_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::new(dir.path().join("absent"));

    assert!(matches!(
        manager.try_load().await,
        Err(DeviceError::ConfigurationUnavailable(_))
    ));

    let config = manager.load().await;
    assert_eq!(config, DeviceConfig::default());

    let registry = DeviceRegistry::new(FixtureEnumerator::new(capture_stick()));
    let devices = registry.get_devices(&config);
    assert!(devices.find_by_name("bcm2835-isp").is_none());
}

#[tokio::test]
async fn test_corrupt_config_uses_defaults() {
    let (_dir, manager) = write_config("[[devices]\nname = ").await;
    assert!(manager.try_load().await.is_err());
    assert_eq!(manager.load().await, DeviceConfig::default());
}

#[tokio::test]
async fn test_strict_threshold_drops_configured_device() {
    let strict = r#"
[matching]
acceptance_threshold = 0.99

[[devices]]
name = "Turntable"
audio_device = "USB Soundcard"
"#;
    let (_dir, manager) = write_config(strict).await;
    let config = manager.load().await;

    let registry = DeviceRegistry::new(FixtureEnumerator::new(capture_stick()));
    let devices = registry.get_devices(&config);
    assert!(devices.find_by_name("Turntable").is_none());
    assert!(devices.find_by_name("USB Soundcard").is_some());
}

#[tokio::test]
async fn test_saved_config_is_loaded_back() {
    let dir = TempDir::new().unwrap();
    let manager = ConfigManager::new(dir.path().join("nested"));

    let config = DeviceConfig {
        blacklist: Some(vec!["HDMI".to_string()]),
        devices: vec![DeviceEntry::new("VCR").with_audio("USB Soundcard").with_video("video2")],
        ..DeviceConfig::default()
    };
    manager.save(&config).await.unwrap();
    assert!(manager.exists());

    let loaded = manager.load().await;
    assert_eq!(loaded, config);

    let registry = DeviceRegistry::new(FixtureEnumerator::new(capture_stick()));
    let devices = registry.get_devices(&loaded);
    assert_eq!(devices.iter().next().unwrap().display_name(), "VCR");
    // A custom blacklist replaces the default one
    assert!(devices.find_by_name("bcm2835-isp").is_some());
}

#[tokio::test]
async fn test_unnamed_entry_keeps_other_devices() {
    let contents = r#"
[[devices]]
name = "Turntable"
audio_device = "USB PnP"

[[devices]]
name = ""
video_device = "video2"
"#;
    let (_dir, manager) = write_config(contents).await;
    let config = manager.load().await;
    assert_eq!(config.devices.len(), 2);

    let registry = DeviceRegistry::new(FixtureEnumerator::new(capture_stick()));
    let devices = registry.get_devices(&config);
    let turntable = devices.find_by_name("Turntable").unwrap();
    assert_eq!(turntable.audio_address(), Some(AudioAddress::new(2, 0)));
    assert!(devices.find_by_name("").is_none());
}

#[test]
fn test_template_parses() {
    let config = DeviceConfig::from_toml_str(DeviceConfig::template()).unwrap();
    assert!(config.devices.is_empty());
    assert_eq!(config.blacklist(), vec!["bcm2835-isp", "bcm2835-codec-decode"]);
}
