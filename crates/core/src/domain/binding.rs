//! Capture/playback lifecycle for resolved devices
//!
//! A [`DeviceBinding`] owns a resolved [`Device`] and moves between
//! [`BindingState::Idle`] and [`BindingState::Running`]. How a stream is
//! actually started is behind the [`StreamLauncher`] trait; the `infra` crate
//! provides a subprocess implementation.

use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::device::Device;

/// Errors that can occur while starting or stopping a stream
#[derive(Debug, Error)]
pub enum BindingError {
    /// Required executable is not installed
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Process could not be spawned
    #[error("Failed to launch {command}: {reason}")]
    Launch { command: String, reason: String },

    /// Process could not be terminated or reaped
    #[error("Failed to stop stream: {0}")]
    Stop(String),
}

pub type Result<T> = std::result::Result<T, BindingError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Idle,
    Running,
}

impl fmt::Display for BindingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingState::Idle => f.write_str("idle"),
            BindingState::Running => f.write_str("running"),
        }
    }
}

/// A stream that has been started
pub trait RunningStream: Send {
    /// Terminate the stream; must tolerate being called on an exited stream
    fn stop(&mut self) -> Result<()>;

    /// True once the stream exited on its own
    fn has_exited(&mut self) -> bool;
}

/// Starts streams for devices
pub trait StreamLauncher: Send + Sync {
    fn launch(&self, device: &Device) -> Result<Box<dyn RunningStream>>;
}

/// Lifecycle of one device's stream
pub struct DeviceBinding<L: StreamLauncher> {
    device: Device,
    launcher: L,
    stream: Option<Box<dyn RunningStream>>,
}

impl<L: StreamLauncher> DeviceBinding<L> {
    pub fn new(device: Device, launcher: L) -> Self {
        Self {
            device,
            launcher,
            stream: None,
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn state(&self) -> BindingState {
        if self.stream.is_some() {
            BindingState::Running
        } else {
            BindingState::Idle
        }
    }

    /// Start the stream, restarting it when already running
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            debug!(device = self.device.display_name(), "Restarting running stream");
            self.stop()?;
        }

        let stream = self.launcher.launch(&self.device)?;
        self.stream = Some(stream);
        info!(
            device = self.device.display_name(),
            identity = %self.device.identity(),
            "Stream started"
        );
        Ok(())
    }

    /// Stop the stream; a no-op when idle
    pub fn stop(&mut self) -> Result<()> {
        match self.stream.take() {
            Some(mut stream) => {
                stream.stop()?;
                info!(device = self.device.display_name(), "Stream stopped");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Refresh the state, returning to idle if the stream exited by itself
    pub fn poll(&mut self) -> BindingState {
        if let Some(stream) = self.stream.as_mut() {
            if stream.has_exited() {
                debug!(device = self.device.display_name(), "Stream exited");
                let _ = stream.stop();
                self.stream = None;
            }
        }
        self.state()
    }
}

impl<L: StreamLauncher> Drop for DeviceBinding<L> {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!(device = self.device.display_name(), error = %e, "Failed to stop stream on drop");
        }
    }
}
