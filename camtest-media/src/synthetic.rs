//! Synthetic capture and encoder backends
//!
//! Used on hosts without camera hardware and by the demo. Both backends can
//! be scripted to fail the way a real host does (permission prompts, a
//! missing rear camera, encoders that reject a codec).

use crate::capture::{MediaConstraints, MediaDeviceGateway};
use crate::codecs::EncoderConfig;
use crate::recorder::{Encoder, EncoderBackend};
use crate::tracks::{MediaStream, MediaTrack, TrackKind, VideoResolution};
use async_trait::async_trait;
use bytes::Bytes;
use camtest_core::{CamTestError, CamTestResult, CaptureDevice, DeviceKind, FacingMode};
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashSet;
use tokio::time::Instant;
use tracing::{debug, info};

/// EBML magic that opens every WebM file
const WEBM_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

/// Virtual cameras and microphone
#[derive(Debug)]
pub struct SyntheticDeviceGateway {
    devices: Vec<CaptureDevice>,
    deny_permission: bool,
    unavailable: Mutex<HashSet<FacingMode>>,
    opened: Mutex<usize>,
}

impl SyntheticDeviceGateway {
    /// Front camera, rear camera and one microphone
    pub fn new() -> Self {
        Self::with_devices(vec![
            CaptureDevice::camera("synthetic-front", "Synthetic Front Camera"),
            CaptureDevice::camera("synthetic-rear", "Synthetic Rear Camera"),
            CaptureDevice::microphone("synthetic-mic", "Synthetic Microphone"),
        ])
    }

    /// Custom device list
    pub fn with_devices(devices: Vec<CaptureDevice>) -> Self {
        Self {
            devices,
            deny_permission: false,
            unavailable: Mutex::new(HashSet::new()),
            opened: Mutex::new(0),
        }
    }

    /// Refuse every open call as a user dismissing the permission prompt
    pub fn deny_permission(mut self) -> Self {
        self.deny_permission = true;
        self
    }

    /// Make a camera unavailable (e.g. no rear camera on a laptop)
    pub fn set_unavailable(&self, facing_mode: FacingMode, unavailable: bool) {
        let mut set = self.unavailable.lock();
        if unavailable {
            set.insert(facing_mode);
        } else {
            set.remove(&facing_mode);
        }
    }

    /// Number of streams opened so far
    pub fn open_count(&self) -> usize {
        *self.opened.lock()
    }

    fn label_for(&self, kind: DeviceKind, index: usize) -> Option<&str> {
        self.devices
            .iter()
            .filter(|d| d.kind == kind)
            .nth(index)
            .map(|d| d.label.as_str())
    }
}

impl Default for SyntheticDeviceGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaDeviceGateway for SyntheticDeviceGateway {
    async fn enumerate(&self) -> CamTestResult<Vec<CaptureDevice>> {
        Ok(self.devices.clone())
    }

    async fn open(&self, constraints: &MediaConstraints) -> CamTestResult<MediaStream> {
        constraints.validate()?;

        if self.deny_permission {
            return Err(CamTestError::PermissionDenied {
                operation: "camera and microphone access".to_string(),
            });
        }
        if self.unavailable.lock().contains(&constraints.facing_mode) {
            return Err(CamTestError::DeviceUnavailable {
                reason: format!("no {} camera", constraints.facing_mode),
            });
        }

        let camera_index = match constraints.facing_mode {
            FacingMode::User => 0,
            FacingMode::Environment => 1,
        };
        let video_label = self
            .label_for(DeviceKind::VideoInput, camera_index)
            .or_else(|| self.label_for(DeviceKind::VideoInput, 0))
            .ok_or_else(|| CamTestError::DeviceUnavailable {
                reason: "no camera connected".to_string(),
            })?
            .to_string();

        let audio = if constraints.audio {
            let label = self
                .label_for(DeviceKind::AudioInput, 0)
                .ok_or_else(|| CamTestError::DeviceUnavailable {
                    reason: "no microphone connected".to_string(),
                })?;
            Some(MediaTrack::new(TrackKind::Audio, label))
        } else {
            None
        };

        *self.opened.lock() += 1;
        info!(
            "🎥 Opened synthetic stream ({}, {}x{})",
            constraints.facing_mode,
            constraints.ideal_resolution.width,
            constraints.ideal_resolution.height
        );

        Ok(MediaStream::new(
            MediaTrack::new(TrackKind::Video, &video_label),
            audio,
            constraints.facing_mode,
            constraints.ideal_resolution,
        ))
    }
}

/// Encoder factory producing bitrate-sized noise in a WebM envelope
#[derive(Debug)]
pub struct SyntheticEncoderBackend {
    supported: HashSet<String>,
    rejected: HashSet<String>,
}

impl SyntheticEncoderBackend {
    /// Supports every default WebM configuration
    pub fn new() -> Self {
        Self {
            supported: crate::codecs::DEFAULT_MIME_PREFERENCES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            rejected: HashSet::new(),
        }
    }

    /// Claim support for exactly these MIME types
    pub fn supporting(mime_types: &[&str]) -> Self {
        Self {
            supported: mime_types.iter().map(|m| m.to_string()).collect(),
            rejected: HashSet::new(),
        }
    }

    /// Claim support for a MIME type but fail when it is opened
    pub fn rejecting(mut self, mime_type: &str) -> Self {
        self.rejected.insert(mime_type.to_string());
        self
    }
}

impl Default for SyntheticEncoderBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EncoderBackend for SyntheticEncoderBackend {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.supported.contains(mime_type)
    }

    async fn open(
        &self,
        stream: &MediaStream,
        config: &EncoderConfig,
    ) -> CamTestResult<Box<dyn Encoder>> {
        if self.rejected.contains(&config.mime_type) {
            return Err(CamTestError::Encoder {
                mime_type: config.mime_type.clone(),
                reason: "configuration not supported".to_string(),
            });
        }
        debug!(
            "Opening synthetic encoder for stream {} at {} bps",
            stream.id(),
            config.video_bits_per_second
        );
        Ok(Box::new(SyntheticEncoder {
            bytes_per_second: u64::from(config.video_bits_per_second / 8),
            resolution: stream.resolution(),
            last_drain: Instant::now(),
            header_written: false,
        }))
    }
}

struct SyntheticEncoder {
    bytes_per_second: u64,
    resolution: VideoResolution,
    last_drain: Instant,
    header_written: bool,
}

impl SyntheticEncoder {
    fn drain(&mut self) -> Bytes {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_drain);
        self.last_drain = now;

        let len = (self.bytes_per_second as f64 * elapsed.as_secs_f64()) as usize;
        let mut data = Vec::with_capacity(len + WEBM_MAGIC.len() + 8);
        if !self.header_written {
            data.extend_from_slice(&WEBM_MAGIC);
            data.extend_from_slice(&self.resolution.width.to_be_bytes());
            data.extend_from_slice(&self.resolution.height.to_be_bytes());
            self.header_written = true;
        }
        data.extend(noise(len));
        Bytes::from(data)
    }
}

fn noise(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rand::thread_rng().fill(&mut buf[..]);
    buf
}

#[async_trait]
impl Encoder for SyntheticEncoder {
    async fn request_data(&mut self) -> CamTestResult<Bytes> {
        Ok(self.drain())
    }

    async fn finish(&mut self) -> CamTestResult<Bytes> {
        Ok(self.drain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_gateway_opens_requested_camera() {
        let gateway = SyntheticDeviceGateway::new();
        let constraints = MediaConstraints::default().with_facing_mode(FacingMode::Environment);

        let stream = gateway.open(&constraints).await.unwrap();
        assert_eq!(stream.facing_mode(), FacingMode::Environment);
        assert_eq!(stream.video_track().label(), "Synthetic Rear Camera");
        assert!(stream.audio_track().is_some());
        assert_eq!(gateway.open_count(), 1);
    }

    #[tokio::test]
    async fn test_gateway_scripted_failures() {
        let gateway = SyntheticDeviceGateway::new();
        gateway.set_unavailable(FacingMode::Environment, true);
        let constraints = MediaConstraints::default().with_facing_mode(FacingMode::Environment);
        assert!(matches!(
            gateway.open(&constraints).await,
            Err(CamTestError::DeviceUnavailable { .. })
        ));

        let denied = SyntheticDeviceGateway::new().deny_permission();
        assert!(matches!(
            denied.open(&MediaConstraints::default()).await,
            Err(CamTestError::PermissionDenied { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_encoder_output_tracks_bitrate() {
        let gateway = SyntheticDeviceGateway::new();
        let stream = gateway.open(&MediaConstraints::default()).await.unwrap();
        let backend = SyntheticEncoderBackend::new();
        let config = EncoderConfig {
            mime_type: "video/webm".to_string(),
            video_bits_per_second: 8_000,
        };

        let mut encoder = backend.open(&stream, &config).await.unwrap();
        tokio::time::advance(std::time::Duration::from_secs(1)).await;
        let first = encoder.request_data().await.unwrap();
        assert_eq!(&first[..4], &WEBM_MAGIC);
        assert_eq!(first.len(), 1_000 + 12);

        tokio::time::advance(std::time::Duration::from_secs(2)).await;
        let second = encoder.request_data().await.unwrap();
        assert_eq!(second.len(), 2_000);
    }
}
