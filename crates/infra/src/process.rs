//! Subprocess-backed capture and playback streams
//!
//! Audio is captured with `arecord` and piped into `aplay`; video is shown
//! with an external player. Composite devices run both.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use analog_media_core::domain::binding::{BindingError, Result, RunningStream, StreamLauncher};
use analog_media_core::domain::device::{AudioAddress, Device};

use crate::player::{PlayerCommand, VideoPlayer};
use crate::tools::find_executable;

/// Time a process gets to exit after SIGTERM before it is killed
const TERMINATE_GRACE: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Launches streams as child processes
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    video_player: String,
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self::new("auto")
    }
}

impl ProcessLauncher {
    /// `video_player` is `auto`, a known player name or an executable
    pub fn new(video_player: impl Into<String>) -> Self {
        Self {
            video_player: video_player.into(),
        }
    }

    /// Command capturing from `address`
    pub fn capture_command(arecord: PathBuf, address: AudioAddress) -> PlayerCommand {
        PlayerCommand::new(
            arecord,
            ["-D".to_string(), address.to_string(), "-f".to_string(), "S16_LE".to_string()],
        )
    }

    /// Command for the configured player, or `ToolNotFound`
    pub fn video_command(&self, node: &str) -> Result<PlayerCommand> {
        let (player, exe) = VideoPlayer::select(&self.video_player)
            .ok_or_else(|| BindingError::ToolNotFound(format!("video player ({})", self.video_player)))?;
        Ok(player.command(exe, node))
    }

    fn spawn_audio(&self, address: AudioAddress) -> Result<ProcessStream> {
        let arecord = find_executable("arecord").ok_or_else(|| BindingError::ToolNotFound("arecord".to_string()))?;
        let capture = Self::capture_command(arecord, address);
        let label = address.to_string();

        let Some(aplay) = find_executable("aplay") else {
            warn!(device = %address, "aplay not found, capturing without playback");
            let child = spawn(&capture, Stdio::null(), Stdio::null())?;
            return Ok(ProcessStream::new(label, vec![child]));
        };

        let mut recorder = spawn(&capture, Stdio::null(), Stdio::piped())?;
        let Some(pipe) = recorder.stdout.take() else {
            let _ = terminate(&mut recorder);
            return Err(BindingError::Launch {
                command: capture.to_string(),
                reason: "stdout not captured".to_string(),
            });
        };

        let playback = PlayerCommand::new(aplay, Vec::new());
        match spawn(&playback, Stdio::from(pipe), Stdio::null()) {
            Ok(player) => Ok(ProcessStream::new(label, vec![recorder, player])),
            Err(e) => {
                let _ = terminate(&mut recorder);
                Err(e)
            }
        }
    }

    fn spawn_video(&self, node: &str) -> Result<ProcessStream> {
        let command = self.video_command(node)?;
        let child = spawn(&command, Stdio::null(), Stdio::null())?;
        Ok(ProcessStream::new(node, vec![child]))
    }
}

impl StreamLauncher for ProcessLauncher {
    fn launch(&self, device: &Device) -> Result<Box<dyn RunningStream>> {
        match device {
            Device::Audio(audio) => Ok(Box::new(self.spawn_audio(audio.address)?)),
            Device::Video(video) => Ok(Box::new(self.spawn_video(&video.node)?)),
            Device::Composite(composite) => {
                let mut audio = self.spawn_audio(composite.audio.address)?;
                match self.spawn_video(&composite.video.node) {
                    Ok(video) => Ok(Box::new(CompositeStream { audio, video })),
                    Err(e) => {
                        let _ = audio.stop();
                        Err(e)
                    }
                }
            }
        }
    }
}

fn spawn(command: &PlayerCommand, stdin: Stdio, stdout: Stdio) -> Result<Child> {
    info!(command = %command, "Starting process");
    Command::new(&command.program)
        .args(&command.args)
        .stdin(stdin)
        .stdout(stdout)
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| BindingError::Launch {
            command: command.to_string(),
            reason: e.to_string(),
        })
}

/// SIGTERM, wait for a grace period, then SIGKILL
fn terminate(child: &mut Child) -> Result<()> {
    if let Ok(Some(_)) = child.try_wait() {
        return Ok(());
    }

    let pid = child.id() as libc::pid_t;
    // SAFETY: `pid` belongs to a child we have not reaped yet
    let sent = unsafe { libc::kill(pid, libc::SIGTERM) } == 0;

    if sent {
        let deadline = Instant::now() + TERMINATE_GRACE;
        while Instant::now() < deadline {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(pid, %status, "Process terminated");
                    return Ok(());
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(BindingError::Stop(e.to_string())),
            }
        }
        warn!(pid, "Process ignored SIGTERM, killing");
    }

    child.kill().map_err(|e| BindingError::Stop(e.to_string()))?;
    child.wait().map_err(|e| BindingError::Stop(e.to_string()))?;
    Ok(())
}

/// Processes started for one stream, stopped in reverse start order
pub struct ProcessStream {
    label: String,
    children: Vec<Child>,
}

impl ProcessStream {
    fn new(label: impl Into<String>, children: Vec<Child>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    /// Run an arbitrary command as a stream
    pub fn spawn(label: impl Into<String>, command: &PlayerCommand) -> Result<Self> {
        let child = spawn(command, Stdio::null(), Stdio::null())?;
        Ok(Self::new(label, vec![child]))
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl RunningStream for ProcessStream {
    fn stop(&mut self) -> Result<()> {
        let mut first_error = None;
        while let Some(mut child) = self.children.pop() {
            if let Err(e) = terminate(&mut child) {
                warn!(stream = %self.label, error = %e, "Failed to stop process");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn has_exited(&mut self) -> bool {
        self.children
            .iter_mut()
            .any(|child| !matches!(child.try_wait(), Ok(None)))
    }
}

impl Drop for ProcessStream {
    fn drop(&mut self) {
        let _ = RunningStream::stop(self);
    }
}

/// Audio and video halves of a composite device
struct CompositeStream {
    audio: ProcessStream,
    video: ProcessStream,
}

impl RunningStream for CompositeStream {
    fn stop(&mut self) -> Result<()> {
        let video = self.video.stop();
        let audio = self.audio.stop();
        video.and(audio)
    }

    fn has_exited(&mut self) -> bool {
        self.video.has_exited() || self.audio.has_exited()
    }
}
