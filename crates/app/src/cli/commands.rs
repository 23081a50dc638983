//! Subcommand handlers

use anyhow::{anyhow, bail, Context};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use analog_media_core::domain::resolver::DEFAULT_VIDEO_QUERY;
use analog_media_core::{
    BindingState, ConfigManager, DeviceBinding, DeviceConfig, DeviceRegistry, Resolver,
    StreamLauncher,
};
use analog_media_infra::{IconLocator, ProcessLauncher, SystemEnumerator};

/// Explicit path, else the default location; unavailable configuration degrades to defaults
pub async fn load_config(path: Option<PathBuf>) -> DeviceConfig {
    let manager = match path {
        Some(path) => ConfigManager::with_path(path),
        None => match ConfigManager::default_config_dir() {
            Ok(dir) => ConfigManager::new(dir),
            Err(e) => {
                warn!(error = %e, "No configuration directory, using defaults");
                return DeviceConfig::default();
            }
        },
    };
    manager.load().await
}

fn registry() -> DeviceRegistry<SystemEnumerator> {
    DeviceRegistry::new(SystemEnumerator::default())
}

pub fn list(config: &DeviceConfig) -> anyhow::Result<()> {
    let devices = registry().get_devices(config);
    if devices.is_empty() {
        println!("No analog devices found");
        return Ok(());
    }
    for device in &devices {
        println!(
            "{:<36} {:<12} {} ({})",
            device.identity().as_str(),
            device.kind().to_string(),
            device.display_name(),
            device.icon()
        );
    }
    Ok(())
}

pub fn summary(config: &DeviceConfig, raw_icons: bool) -> anyhow::Result<()> {
    let mut summary = registry().get_device_summary(config);
    if !raw_icons {
        let locator = IconLocator::default();
        summary = summary.map_icons(|icon| locator.locate(icon));
    }
    println!("{}", summary.to_json_pretty().context("Failed to serialize summary")?);
    Ok(())
}

pub fn find_audio(config: &DeviceConfig, query: &str) -> anyhow::Result<()> {
    let snapshot = registry().snapshot();
    let resolver = Resolver::new(&snapshot, config.matching);
    for candidate in resolver.find_audio_device(query) {
        let card = candidate.target;
        println!(
            "{:.3}  {:<8} {} [{}]",
            candidate.score,
            card.address().to_string(),
            card.name,
            card.type_tag
        );
    }
    Ok(())
}

pub fn find_video(config: &DeviceConfig, query: Option<&str>) -> anyhow::Result<()> {
    let snapshot = registry().snapshot();
    let resolver = Resolver::new(&snapshot, config.matching);
    for candidate in resolver.find_video_device(query.unwrap_or(DEFAULT_VIDEO_QUERY)) {
        let group = candidate.target;
        println!("{:.3}  {} -> {}", candidate.score, group.name, group.nodes.join(", "));
    }
    Ok(())
}

pub fn resolve_audio(config: &DeviceConfig, query: &str) -> anyhow::Result<()> {
    let snapshot = registry().snapshot();
    let device = Resolver::new(&snapshot, config.matching).resolve_audio_device(Some(query))?;
    println!("{}", device.address);
    Ok(())
}

pub fn resolve_video(config: &DeviceConfig, query: Option<&str>) -> anyhow::Result<()> {
    let snapshot = registry().snapshot();
    let device = Resolver::new(&snapshot, config.matching).resolve_video_device(query)?;
    println!("{}", device.node);
    Ok(())
}

pub async fn play(config: &DeviceConfig, name: &str) -> anyhow::Result<()> {
    let devices = registry().get_devices(config);
    let device = devices
        .find_by_name(name)
        .cloned()
        .ok_or_else(|| anyhow!("No device named {:?}", name))?;

    let mut binding = DeviceBinding::new(device, ProcessLauncher::new(config.player.video.clone()));
    binding.start()?;
    info!(device = name, "Press Ctrl-C to stop");

    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                break;
            }
            _ = ticker.tick() => {
                let (polled, state) = poll_blocking(binding).await?;
                binding = polled;
                if state == BindingState::Idle {
                    bail!("Stream for {:?} exited", name);
                }
            }
        }
    }

    stop_blocking(binding).await
}

// Stopping waits for processes to exit, so poll and stop run off the runtime threads

async fn poll_blocking<L>(mut binding: DeviceBinding<L>) -> anyhow::Result<(DeviceBinding<L>, BindingState)>
where
    L: StreamLauncher + 'static,
{
    tokio::task::spawn_blocking(move || {
        let state = binding.poll();
        (binding, state)
    })
    .await
    .context("Stream poll task failed")
}

async fn stop_blocking<L>(mut binding: DeviceBinding<L>) -> anyhow::Result<()>
where
    L: StreamLauncher + 'static,
{
    tokio::task::spawn_blocking(move || binding.stop())
        .await
        .context("Stream stop task failed")??;
    Ok(())
}
