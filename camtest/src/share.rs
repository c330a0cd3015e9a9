//! Native share sheet seam

use async_trait::async_trait;
use bytes::Bytes;
use camtest_core::{CamTestResult, RecordedClip};

/// Title passed to the share sheet
pub const SHARE_TITLE: &str = "Recorded video";

/// Text passed to the share sheet
pub const SHARE_TEXT: &str = "Video from the camera test";

/// A clip packaged as a file for sharing
#[derive(Debug, Clone, PartialEq)]
pub struct SharedFile {
    /// File name offered to the receiving app
    pub file_name: String,
    /// MIME type of the clip
    pub mime_type: String,
    /// File contents
    pub data: Bytes,
}

impl SharedFile {
    /// Package a clip, naming it after `timestamp_ms`
    pub fn from_clip(clip: &RecordedClip, timestamp_ms: i64) -> Self {
        Self {
            file_name: clip.upload_file_name(timestamp_ms),
            mime_type: clip.mime_type().to_string(),
            data: clip.data().clone(),
        }
    }
}

/// How a share attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The receiving app accepted the file
    Shared,
    /// The user dismissed the sheet
    Aborted,
    /// No share sheet on this host
    Unavailable,
}

/// Host share sheet
#[async_trait]
pub trait ShareSheet: Send + Sync {
    /// Whether the host can share files at all
    fn can_share(&self) -> bool {
        true
    }

    /// Present the sheet. Dismissal is `Ok(ShareOutcome::Aborted)`, not an error.
    async fn share(&self, file: SharedFile, title: &str, text: &str)
        -> CamTestResult<ShareOutcome>;
}
