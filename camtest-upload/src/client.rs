//! Clip upload client

use crate::protocol::{ServerAck, UploadMetadata, UploadReceipt, USER_ID_FIELD, VIDEO_FIELD};
use async_trait::async_trait;
use camtest_core::{CamTestError, CamTestResult, RecordedClip};
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

/// Default endpoint of the bundled upload test server
pub const DEFAULT_UPLOAD_URL: &str = "http://localhost:8000/upload-test";

/// Transmits a finalized clip to a remote endpoint
///
/// One call is one attempt. Implementations must not retry on their own.
#[async_trait]
pub trait UploadClient: Send + Sync {
    /// Upload a clip.
    ///
    /// Fails with [`CamTestError::Network`] when no response arrives,
    /// [`CamTestError::Server`] on a non-success status and
    /// [`CamTestError::MalformedResponse`] when the success body lacks the
    /// byte size.
    async fn upload(
        &self,
        clip: &RecordedClip,
        metadata: &UploadMetadata,
    ) -> CamTestResult<ServerAck>;
}

/// Multipart upload over HTTP
#[derive(Debug, Clone)]
pub struct HttpUploadClient {
    client: reqwest::Client,
    url: String,
}

impl HttpUploadClient {
    /// Create a client for an endpoint URL
    pub fn new(url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Create a client reusing an existing connection pool
    pub fn with_client(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_form(&self, clip: &RecordedClip, metadata: &UploadMetadata) -> Form {
        let file_name = clip.upload_file_name(chrono::Utc::now().timestamp_millis());
        let content_type = match clip.container() {
            "" => "application/octet-stream",
            container => container,
        };

        // Bytes is reference counted, so each part shares the clip buffer.
        let video_part = || Part::stream(clip.data().clone()).file_name(file_name.clone());
        let part = video_part().mime_str(content_type).unwrap_or_else(|e| {
            warn!(
                "Invalid clip content type {:?} ({}), sending without one",
                content_type, e
            );
            video_part()
        });

        let mut form = Form::new().part(VIDEO_FIELD, part);
        if let Some(user_id) = &metadata.user_id {
            form = form.text(USER_ID_FIELD, user_id.clone());
        }
        form
    }
}

impl Default for HttpUploadClient {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOAD_URL)
    }
}

#[async_trait]
impl UploadClient for HttpUploadClient {
    async fn upload(
        &self,
        clip: &RecordedClip,
        metadata: &UploadMetadata,
    ) -> CamTestResult<ServerAck> {
        info!("📤 Uploading {:.2} MB to {}", clip.size_mb(), self.url);
        let form = self.build_form(clip, metadata);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CamTestError::Network {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Upload rejected with HTTP {}: {}", status.as_u16(), body);
            return Err(CamTestError::Server {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unknown Status")
                    .to_string(),
            });
        }

        let receipt: UploadReceipt =
            response
                .json()
                .await
                .map_err(|e| CamTestError::MalformedResponse {
                    reason: e.to_string(),
                })?;
        debug!("Upload receipt: {:?}", receipt);
        info!("✅ Upload successful: {} bytes", receipt.size_bytes);

        Ok(ServerAck::from(receipt))
    }
}
