//! Hardware fixtures shared by the integration tests

use analog_media_core::domain::device::Result;
use analog_media_core::{DeviceEnumerator, DeviceError, HardwareSnapshot, RawAudioCard, VideoGroup};

#[cfg(test)]
mod config_integration;
#[cfg(test)]
mod properties;

/// `arecord -l` output of a Raspberry Pi with a PlayStation Eye and a USB dongle
pub const ARECORD_LISTING: &str = "\
**** List of CAPTURE Hardware Devices ****
card 1: Camera [USB Camera-B4.09.24.1], device 0: USB Audio [USB Audio]
  Subdevices: 1/1
  Subdevice #0: subdevice #0
card 2: Device [USB PnP Sound Device], device 0: USB Audio [USB Audio]
  Subdevices: 1/1
  Subdevice #0: subdevice #0
";

/// `v4l2-ctl --list-devices` output of the same machine
pub const V4L2_LISTING: &str = "\
bcm2835-codec-decode (platform:bcm2835-codec):
\t/dev/video10
\t/dev/video11
\t/dev/video12

bcm2835-isp (platform:bcm2835-isp):
\t/dev/video13
\t/dev/video14

USB Camera-B4.09.24.1 (usb-3f980000.usb-1.2):
\t/dev/video0
\t/dev/video1
";

/// Enumerator replaying a fixed snapshot
#[derive(Debug, Clone, Default)]
pub struct FixtureEnumerator {
    snapshot: HardwareSnapshot,
}

impl FixtureEnumerator {
    pub fn new(snapshot: HardwareSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl DeviceEnumerator for FixtureEnumerator {
    fn audio_cards(&self) -> Result<Vec<RawAudioCard>> {
        Ok(self.snapshot.audio_cards.clone())
    }

    fn video_groups(&self) -> Result<Vec<VideoGroup>> {
        Ok(self.snapshot.video_groups.clone())
    }
}

/// Enumerator whose tools are missing
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingEnumerator;

impl DeviceEnumerator for FailingEnumerator {
    fn audio_cards(&self) -> Result<Vec<RawAudioCard>> {
        Err(DeviceError::EnumerationFailure("arecord: not found".to_string()))
    }

    fn video_groups(&self) -> Result<Vec<VideoGroup>> {
        Err(DeviceError::EnumerationFailure("v4l2-ctl: not found".to_string()))
    }
}

/// Camera with a built-in microphone that no fingerprint knows about
pub fn capture_stick() -> HardwareSnapshot {
    HardwareSnapshot::new(
        vec![
            RawAudioCard::new(0, 0, "bcm2835-isp", "bcm2835 ALSA"),
            RawAudioCard::new(1, 0, "Stick [UVC Capture Stick]", "USB Audio"),
            RawAudioCard::new(2, 0, "USB PnP Sound Device", "USB Audio"),
        ],
        vec![VideoGroup::new(
            "UVC Capture Stick (usb-0000:00:14.0-2)",
            ["/dev/video2", "/dev/video3"],
        )],
    )
}
