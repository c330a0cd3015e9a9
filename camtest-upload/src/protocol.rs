//! Upload wire protocol
//!
//! The request is `multipart/form-data` with a `video` file part and an
//! optional `user_id` text part. Responses are JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the multipart field carrying the clip
pub const VIDEO_FIELD: &str = "video";

/// Name of the multipart field carrying the host user identifier
pub const USER_ID_FIELD: &str = "user_id";

/// Metadata sent alongside a clip
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    /// Authenticated host user, when the host supplies one
    pub user_id: Option<String>,
}

impl UploadMetadata {
    /// Metadata for an identified user
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }
}

/// Successful upload response
///
/// Only the byte size is required; the remaining fields are informational and
/// filled in by the bundled test server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Response status, `"success"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Stored file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Bytes received by the server
    #[serde(alias = "sizeBytes")]
    pub size_bytes: u64,
    /// Megabytes received, rounded to two decimals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_mb: Option<f64>,
    /// Content type the client declared for the file part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// User identifier echoed back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Rough guess whether the clip carries audio
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_audio: Option<String>,
    /// Server timestamp (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Where the server stored the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_path: Option<String>,
}

/// Server acknowledgement handed back to the session
#[derive(Debug, Clone, PartialEq)]
pub struct ServerAck {
    /// Bytes the server reports it received
    pub size_bytes: u64,
    /// Full response body
    pub receipt: UploadReceipt,
}

impl From<UploadReceipt> for ServerAck {
    fn from(receipt: UploadReceipt) -> Self {
        Self {
            size_bytes: receipt.size_bytes,
            receipt,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `"error"`
    pub status: String,
    /// Human readable reason
    pub message: String,
    /// Server timestamp (ISO 8601)
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// `GET /` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Greeting
    pub message: String,
    /// Server version
    pub version: String,
    /// Endpoint name to path
    pub endpoints: BTreeMap<String, String>,
}

/// `GET /health` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `"healthy"`
    pub status: String,
    /// Server timestamp (ISO 8601)
    pub timestamp: String,
}

/// One stored clip in a `GET /videos` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredVideo {
    /// File name under the storage directory
    pub filename: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// File size in megabytes, rounded to two decimals
    pub size_mb: f64,
}

/// `GET /videos` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoListing {
    /// `"success"`
    pub status: String,
    /// Number of stored clips
    pub count: usize,
    /// Stored clips
    pub videos: Vec<StoredVideo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_accepts_minimal_body() {
        let receipt: UploadReceipt =
            tokio_test::assert_ok!(serde_json::from_str(r#"{"size_bytes": 2048}"#));
        assert_eq!(receipt.size_bytes, 2048);
        assert!(receipt.filename.is_none());
    }

    #[test]
    fn test_receipt_accepts_camel_case_size() {
        let receipt: UploadReceipt = serde_json::from_str(r#"{"sizeBytes": 7}"#).unwrap();
        assert_eq!(ServerAck::from(receipt).size_bytes, 7);
    }

    #[test]
    fn test_receipt_requires_size() {
        tokio_test::assert_err!(serde_json::from_str::<UploadReceipt>(
            r#"{"status": "success"}"#
        ));
    }

    #[test]
    fn test_full_receipt_serialization() {
        let receipt = UploadReceipt {
            status: Some("success".to_string()),
            filename: Some("20250101_120000_video_1.webm".to_string()),
            size_bytes: 150_000,
            size_mb: Some(0.14),
            content_type: Some("video/webm".to_string()),
            user_id: Some("42".to_string()),
            has_audio: Some("likely".to_string()),
            timestamp: None,
            saved_path: None,
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["size_bytes"], 150_000);
        assert_eq!(json["has_audio"], "likely");
        assert!(json.get("timestamp").is_none());
    }
}
