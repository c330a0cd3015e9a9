//! # Camera Test Media
//!
//! Capture streams, the device gateway seam, codec negotiation and the
//! chunk-collecting recorder. Platform capture and encoding are reached
//! only through the [`MediaDeviceGateway`] and [`EncoderBackend`] traits.

#![warn(clippy::all)]

pub mod capture;
pub mod codecs;
pub mod recorder;
pub mod synthetic;
pub mod tracks;

// Re-export main types
pub use capture::{MediaConstraints, MediaDeviceGateway};
pub use codecs::{
    default_mime_preferences, degradation_order, negotiate_mime_type, EncoderConfig,
    DEFAULT_MIME_PREFERENCES, DEFAULT_VIDEO_BITS_PER_SECOND,
};
pub use recorder::{Encoder, EncoderBackend, Finalized, Recorder, RecorderOptions, RecorderStats};
pub use synthetic::{SyntheticDeviceGateway, SyntheticEncoderBackend};
pub use tracks::{MediaStream, MediaTrack, TrackKind, TrackState, VideoResolution};
