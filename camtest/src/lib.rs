//! # Camera Test
//!
//! A self-contained camera check: acquire the camera and microphone, record
//! a fixed-length clip, review it, then upload or share it.
//!
//! The [`RecordingSession`] state machine owns all mutable state. Capture,
//! encoding, upload, haptics and sharing are reached through traits so the
//! session runs the same against a real host or against test doubles.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use camtest::{Environment, RecordingSession, SyntheticDeviceGateway, SyntheticEncoderBackend};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), camtest::CamTestError> {
//!     let mut session = RecordingSession::builder()
//!         .gateway(Arc::new(SyntheticDeviceGateway::new()))
//!         .encoder_backend(Arc::new(SyntheticEncoderBackend::new()))
//!         .build()?;
//!
//!     session.initialize(&Environment::localhost()).await?;
//!     session.start_recording().await?;
//!     session.run_countdown().await;
//!
//!     let ack = session.upload().await?;
//!     println!("Server received {} bytes", ack.size_bytes);
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core types for easy access
pub use camtest_core::{
    bytes_to_mb, CamTestError, CamTestResult, CaptureDevice, ClipSource, DeviceKind,
    ErrorCategory, FacingMode, RecordedClip,
};

pub use camtest_media::{
    Encoder, EncoderBackend, EncoderConfig, MediaConstraints, MediaDeviceGateway, MediaStream,
    MediaTrack, RecorderStats, SyntheticDeviceGateway, SyntheticEncoderBackend, TrackKind,
    VideoResolution, DEFAULT_MIME_PREFERENCES,
};

pub use camtest_upload::{HttpUploadClient, ServerAck, UploadClient, UploadMetadata, UploadReceipt};

// Public API modules
pub mod config;
pub mod countdown;
pub mod environment;
pub mod event;
pub mod host;
pub mod logging;
pub mod session;
pub mod share;
pub mod status;

// Re-export main API types
pub use config::SessionConfig;
pub use environment::Environment;
pub use event::{EventStream, SessionEvent};
pub use host::{Host, HostShell, ImpactStyle, NotificationKind, ThemeParams, ThemeVariables};
pub use session::{RecordingSession, RecordingSessionBuilder, SessionState};
pub use share::{ShareOutcome, ShareSheet, SharedFile};
pub use status::{Notice, Notifier, StatusIndicator, StatusKind};
