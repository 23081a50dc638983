//! Video player selection and command lines

use std::fmt;
use std::path::PathBuf;
use tracing::debug;

use crate::tools::find_executable;

/// Players tried, in order, when the setting is `auto`
const AUTO_PLAYERS: [&str; 3] = ["mpv", "vlc", "mplayer"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoPlayer {
    Mpv,
    Vlc,
    Cvlc,
    Mplayer,
    /// Any other executable, started without arguments
    Custom(String),
}

impl VideoPlayer {
    pub fn from_name(name: &str) -> Self {
        match name {
            "mpv" => VideoPlayer::Mpv,
            "vlc" => VideoPlayer::Vlc,
            "cvlc" => VideoPlayer::Cvlc,
            "mplayer" => VideoPlayer::Mplayer,
            other => VideoPlayer::Custom(other.to_string()),
        }
    }

    pub fn program(&self) -> &str {
        match self {
            VideoPlayer::Mpv => "mpv",
            VideoPlayer::Vlc => "vlc",
            VideoPlayer::Cvlc => "cvlc",
            VideoPlayer::Mplayer => "mplayer",
            VideoPlayer::Custom(program) => program,
        }
    }

    /// Pick a player for the configured setting
    ///
    /// `auto` selects the first installed of mpv, vlc and mplayer. Returns the
    /// player and its resolved executable, or `None` when nothing is installed.
    pub fn select(setting: &str) -> Option<(VideoPlayer, PathBuf)> {
        let selected = if setting == "auto" {
            AUTO_PLAYERS
                .iter()
                .find_map(|name| find_executable(name).map(|exe| (VideoPlayer::from_name(name), exe)))
        } else {
            let player = VideoPlayer::from_name(setting);
            find_executable(player.program()).map(|exe| (player, exe))
        };
        if let Some((player, exe)) = &selected {
            debug!(player = player.program(), path = %exe.display(), "Selected video player");
        }
        selected
    }

    /// Command showing `node` full screen
    pub fn command(&self, executable: PathBuf, node: &str) -> PlayerCommand {
        let args: Vec<String> = match self {
            VideoPlayer::Vlc | VideoPlayer::Cvlc => vec![
                format!("v4l2://:v4l-vdev={}", node),
                "--fullscreen".to_string(),
                "--video-on-top".to_string(),
            ],
            VideoPlayer::Mpv => vec![
                format!("av://v4l2:{}", node),
                "--profile=low-latency".to_string(),
                "--untimed".to_string(),
                "--fs".to_string(),
            ],
            VideoPlayer::Mplayer => vec![
                "tv://".to_string(),
                "-tv".to_string(),
                format!("driver=v4l2:width=640:height=480:device={}", node),
                "-fps".to_string(),
                "30".to_string(),
            ],
            VideoPlayer::Custom(_) => Vec::new(),
        };
        PlayerCommand {
            program: executable,
            args,
        }
    }
}

/// Program and arguments of a subprocess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl PlayerCommand {
    pub fn new(program: impl Into<PathBuf>, args: impl IntoIterator<Item = String>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().collect(),
        }
    }
}

impl fmt::Display for PlayerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
