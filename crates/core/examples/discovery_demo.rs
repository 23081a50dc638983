//! Example walking through configuration, scanning and reconciliation
//!
//! Run with: cargo run --package analog-media-core --example discovery_demo

use analog_media_core::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("analog_media_core=debug,info")
        .init();

    println!("=== Analog Media Discovery Demo ===\n");

    // 1. Hardware as a Raspberry Pi with a PlayStation Eye reports it
    let snapshot = HardwareSnapshot::new(
        vec![
            RawAudioCard::new(0, 0, "bcm2835-isp", "bcm2835 ALSA"),
            RawAudioCard::new(1, 0, "Camera [USB Camera-B4.09.24.1]", "USB Audio [USB Audio]"),
            RawAudioCard::new(2, 0, "Device [USB PnP Sound Device]", "USB Audio [USB Audio]"),
        ],
        vec![VideoGroup::new(
            "USB Camera-B4.09.24.1 (usb-3f980000.usb-1.2)",
            ["/dev/video0", "/dev/video1"],
        )],
    );
    println!(
        "1. Snapshot: {} audio cards, {} video groups",
        snapshot.audio_cards.len(),
        snapshot.video_groups.len()
    );

    // 2. Rank the audio cards against a free-text query
    println!("\n2. Ranking audio cards for \"USB Soundcard\":");
    let resolver = Resolver::new(&snapshot, MatchSettings::default());
    for candidate in resolver.find_audio_device("USB Soundcard") {
        println!("   {:.3}  {}", candidate.score, candidate.target.name);
    }

    // 3. Raw scan with and without fingerprints
    println!("\n3. Scan without fingerprints:");
    let empty = FingerprintTable::empty();
    for device in scan_devices(&snapshot, &empty) {
        println!("   {} {}", device.kind(), device.display_name());
    }
    println!("   Scan with built-in fingerprints:");
    let builtin = FingerprintTable::builtin();
    for device in scan_devices(&snapshot, &builtin) {
        println!("   {} {}", device.kind(), device.display_name());
    }

    // 4. Save a configuration declaring a device, then load it back
    let dir = tempfile::tempdir()?;
    let manager = ConfigManager::new(dir.path().to_path_buf());
    let config = DeviceConfig {
        devices: vec![DeviceEntry::new("Turntable").with_audio("USB Soundcard")],
        ..DeviceConfig::default()
    };
    manager.save(&config).await?;
    let loaded = manager.load().await;
    println!("\n4. Configuration saved to {}", manager.config_path().display());

    // 5. Reconcile and print the summary
    println!("\n5. Canonical device summary:");
    let devices = reconcile(&snapshot, &builtin, &loaded);
    println!("{}", devices.summary().to_json_pretty()?);

    println!("\n=== Demo Complete ===");
    Ok(())
}
