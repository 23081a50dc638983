//! Linux implementations of the analog media collaborators
//!
//! - `alsa`: capture card enumeration through `arecord -l`
//! - `v4l2`: video group enumeration through `v4l2-ctl --list-devices`
//! - `player` / `process`: subprocess-backed capture and playback
//! - `icons`: icon name lookup in the usual icon directories

pub mod alsa;
pub mod icons;
pub mod player;
pub mod process;
pub mod tools;
pub mod v4l2;

pub use alsa::ArecordEnumerator;
pub use icons::IconLocator;
pub use player::{PlayerCommand, VideoPlayer};
pub use process::ProcessLauncher;
pub use v4l2::V4l2CtlEnumerator;

use analog_media_core::domain::device::{DeviceEnumerator, RawAudioCard, Result, VideoGroup};

/// Enumerator backed by the ALSA and V4L2 command line tools
#[derive(Debug, Clone, Default)]
pub struct SystemEnumerator {
    audio: ArecordEnumerator,
    video: V4l2CtlEnumerator,
}

impl SystemEnumerator {
    pub fn new(audio: ArecordEnumerator, video: V4l2CtlEnumerator) -> Self {
        Self { audio, video }
    }
}

impl DeviceEnumerator for SystemEnumerator {
    fn audio_cards(&self) -> Result<Vec<RawAudioCard>> {
        self.audio.audio_cards()
    }

    fn video_groups(&self) -> Result<Vec<VideoGroup>> {
        self.video.video_groups()
    }
}
