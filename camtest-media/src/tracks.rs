//! Live media tracks and the stream that groups them

use camtest_core::FacingMode;
use tracing::{debug, info};
use uuid::Uuid;

/// Track kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    /// Microphone track
    Audio,
    /// Camera track
    Video,
}

/// Track lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    /// Delivering media
    Live,
    /// Stopped; the hardware lock has been released
    Ended,
}

/// Video resolution information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VideoResolution {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl VideoResolution {
    /// Create a resolution
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Square 720p, the ideal capture size
    pub const SQUARE_720: Self = Self::new(720, 720);
}

/// A single live audio or video track
#[derive(Debug, Clone)]
pub struct MediaTrack {
    id: String,
    kind: TrackKind,
    label: String,
    enabled: bool,
    state: TrackState,
}

impl MediaTrack {
    /// Create a new live track
    pub fn new(kind: TrackKind, label: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            label: label.to_string(),
            enabled: true,
            state: TrackState::Live,
        }
    }

    /// Get track ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get track kind
    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    /// Device label the track was opened from
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the track delivers media (false = muted)
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the track without stopping it
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Get track state
    pub fn state(&self) -> TrackState {
        self.state
    }

    /// Whether the track has not been stopped
    pub fn is_live(&self) -> bool {
        self.state == TrackState::Live
    }

    /// Stop the track. Stopping an ended track does nothing.
    pub fn stop(&mut self) {
        if self.state == TrackState::Live {
            debug!("Stopping {:?} track {} ({})", self.kind, self.id, self.label);
            self.state = TrackState::Ended;
        }
    }
}

/// An open handle to live camera and microphone tracks
#[derive(Debug)]
pub struct MediaStream {
    id: String,
    video: MediaTrack,
    audio: Option<MediaTrack>,
    facing_mode: FacingMode,
    resolution: VideoResolution,
}

impl MediaStream {
    /// Create a stream from already opened tracks
    pub fn new(
        video: MediaTrack,
        audio: Option<MediaTrack>,
        facing_mode: FacingMode,
        resolution: VideoResolution,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            video,
            audio,
            facing_mode,
            resolution,
        }
    }

    /// Get stream ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Camera track
    pub fn video_track(&self) -> &MediaTrack {
        &self.video
    }

    /// Microphone track, if audio was requested and granted
    pub fn audio_track(&self) -> Option<&MediaTrack> {
        self.audio.as_ref()
    }

    /// Mutable microphone track
    pub fn audio_track_mut(&mut self) -> Option<&mut MediaTrack> {
        self.audio.as_mut()
    }

    /// All tracks, video first
    pub fn tracks(&self) -> impl Iterator<Item = &MediaTrack> {
        std::iter::once(&self.video).chain(self.audio.iter())
    }

    /// Facing mode the camera was opened with
    pub fn facing_mode(&self) -> FacingMode {
        self.facing_mode
    }

    /// Resolution the camera settled on
    pub fn resolution(&self) -> VideoResolution {
        self.resolution
    }

    /// Whether the camera track is still live
    pub fn is_active(&self) -> bool {
        self.video.is_live()
    }

    /// Stop every track. Idempotent.
    pub fn stop_all(&mut self) {
        if self.tracks().any(MediaTrack::is_live) {
            info!("⏹️ Releasing stream {}", self.id);
        }
        self.video.stop();
        if let Some(audio) = self.audio.as_mut() {
            audio.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream() -> MediaStream {
        MediaStream::new(
            MediaTrack::new(TrackKind::Video, "Front Camera"),
            Some(MediaTrack::new(TrackKind::Audio, "Built-in Microphone")),
            FacingMode::User,
            VideoResolution::SQUARE_720,
        )
    }

    #[test]
    fn test_stop_all_is_idempotent() {
        let mut stream = stream();
        assert!(stream.is_active());

        stream.stop_all();
        assert!(!stream.is_active());
        assert!(stream.tracks().all(|t| t.state() == TrackState::Ended));

        stream.stop_all();
        assert!(!stream.is_active());
    }

    #[test]
    fn test_disabling_audio_leaves_video_alone() {
        let mut stream = stream();
        stream.audio_track_mut().unwrap().set_enabled(false);

        assert!(!stream.audio_track().unwrap().is_enabled());
        assert!(stream.video_track().is_enabled());
        assert!(stream.audio_track().unwrap().is_live());
    }

    #[test]
    fn test_tracks_order() {
        let stream = stream();
        let kinds: Vec<_> = stream.tracks().map(MediaTrack::kind).collect();
        assert_eq!(kinds, vec![TrackKind::Video, TrackKind::Audio]);
        assert_eq!(stream.resolution(), VideoResolution::SQUARE_720);
    }
}
