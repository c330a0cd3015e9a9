//! # Camera Test Core
//!
//! Error taxonomy and shared data model for the camera test session.
//! The media, upload and session crates all speak in these types.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod clip;
pub mod device;
pub mod error;

// Re-export main types
pub use clip::{bytes_to_mb, ClipSource, RecordedClip};
pub use device::{count_video_inputs, CaptureDevice, DeviceKind, FacingMode};
pub use error::{CamTestError, CamTestResult, ErrorCategory};
