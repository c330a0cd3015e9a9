//! Configuration types and defaults

use camtest_core::FacingMode;
use camtest_media::{
    default_mime_preferences, MediaConstraints, RecorderOptions, VideoResolution,
    DEFAULT_VIDEO_BITS_PER_SECOND,
};
use camtest_upload::DEFAULT_UPLOAD_URL;
use std::time::Duration;

/// Recording session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Length of a recording in seconds
    pub countdown_secs: u32,
    /// Interval at which the recorder collects encoded data
    pub chunk_interval: Duration,
    /// Preferred capture width
    pub ideal_width: u32,
    /// Preferred capture height
    pub ideal_height: u32,
    /// Camera opened on first acquisition
    pub initial_facing_mode: FacingMode,
    /// Request a microphone track
    pub audio_enabled: bool,
    /// Target video bitrate
    pub video_bits_per_second: u32,
    /// Container/codec candidates, most specific first
    pub mime_preferences: Vec<String>,
    /// How long a notice stays visible
    pub notice_duration: Duration,
    /// Upload endpoint
    pub upload_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 10,
            chunk_interval: Duration::from_secs(1),
            ideal_width: 720,
            ideal_height: 720,
            initial_facing_mode: FacingMode::User,
            audio_enabled: true,
            video_bits_per_second: DEFAULT_VIDEO_BITS_PER_SECOND,
            mime_preferences: default_mime_preferences(),
            notice_duration: Duration::from_secs(5),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
        }
    }
}

impl SessionConfig {
    /// Capture constraints for a camera
    pub fn constraints(&self, facing_mode: FacingMode) -> MediaConstraints {
        MediaConstraints {
            ideal_resolution: VideoResolution::new(self.ideal_width, self.ideal_height),
            facing_mode,
            audio: self.audio_enabled,
        }
    }

    /// Recorder options derived from this configuration
    pub fn recorder_options(&self) -> RecorderOptions {
        RecorderOptions {
            mime_preferences: self.mime_preferences.clone(),
            video_bits_per_second: self.video_bits_per_second,
            timeslice: self.chunk_interval,
        }
    }
}
