//! Capture device gateway
//!
//! The gateway is the seam between the session and the host's capture API.
//! It enumerates devices, opens a camera+microphone stream for a set of
//! constraints, and releases streams.

use crate::tracks::{MediaStream, VideoResolution};
use async_trait::async_trait;
use camtest_core::{CamTestError, CamTestResult, CaptureDevice, FacingMode};

/// Constraints passed to [`MediaDeviceGateway::open`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConstraints {
    /// Preferred resolution; the device may settle on something else
    pub ideal_resolution: VideoResolution,
    /// Preferred camera
    pub facing_mode: FacingMode,
    /// Whether a microphone track is requested
    pub audio: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            ideal_resolution: VideoResolution::SQUARE_720,
            facing_mode: FacingMode::User,
            audio: true,
        }
    }
}

impl MediaConstraints {
    /// Validate constraints
    pub fn validate(&self) -> CamTestResult<()> {
        if self.ideal_resolution.width == 0 || self.ideal_resolution.height == 0 {
            return Err(CamTestError::Overconstrained {
                constraint: "resolution".to_string(),
                reason: format!(
                    "{}x{} is not a valid resolution",
                    self.ideal_resolution.width, self.ideal_resolution.height
                ),
            });
        }
        Ok(())
    }

    /// Same constraints with a different facing mode
    pub fn with_facing_mode(&self, facing_mode: FacingMode) -> Self {
        Self {
            facing_mode,
            ..self.clone()
        }
    }
}

/// Host capture API
#[async_trait]
pub trait MediaDeviceGateway: Send + Sync {
    /// Whether the host exposes a capture API at all
    fn is_supported(&self) -> bool {
        true
    }

    /// List capture devices. Fails with [`CamTestError::Enumeration`].
    async fn enumerate(&self) -> CamTestResult<Vec<CaptureDevice>>;

    /// Open a live stream.
    ///
    /// Fails with [`CamTestError::PermissionDenied`],
    /// [`CamTestError::DeviceUnavailable`] or [`CamTestError::Overconstrained`].
    async fn open(&self, constraints: &MediaConstraints) -> CamTestResult<MediaStream>;

    /// Release every track of the stream. Idempotent.
    fn close(&self, stream: &mut MediaStream) {
        stream.stop_all();
    }
}
