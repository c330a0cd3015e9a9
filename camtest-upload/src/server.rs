//! Upload test server
//!
//! Accepts clips from the camera test, stores them on disk and reports what
//! it received.

use crate::protocol::{
    ErrorBody, HealthStatus, ServerInfo, StoredVideo, UploadReceipt, VideoListing, USER_ID_FIELD,
    VIDEO_FIELD,
};
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use camtest_core::{bytes_to_mb, CamTestResult};
use chrono::Local;
use std::collections::BTreeMap;
use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// WebM bodies larger than this are assumed to carry an audio track
const AUDIO_SIZE_THRESHOLD: u64 = 100_000;

/// Upload server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the server binds to
    pub bind_addr: SocketAddr,
    /// Directory uploaded clips are written to
    pub storage_dir: PathBuf,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            storage_dir: PathBuf::from("test_videos"),
            max_upload_bytes: 256 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
struct AppState {
    storage_dir: Arc<PathBuf>,
}

/// Handler failures, rendered as [`ErrorBody`] JSON
#[derive(Error, Debug)]
enum ApiError {
    #[error("{0}")]
    Multipart(#[from] MultipartError),

    #[error("missing multipart field: {0}")]
    MissingField(&'static str),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Multipart(e) => e.status(),
            ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!("❌ Request failed ({}): {}", status, self);
        let body = ErrorBody {
            status: "error".to_string(),
            message: self.to_string(),
            timestamp: Some(Local::now().to_rfc3339()),
        };
        (status, Json(body)).into_response()
    }
}

/// Upload test server
#[derive(Debug, Clone)]
pub struct UploadServer {
    config: ServerConfig,
}

impl UploadServer {
    /// Create new upload server
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        let state = AppState {
            storage_dir: Arc::new(self.config.storage_dir.clone()),
        };

        Router::new()
            .route("/", get(handle_root))
            .route("/health", get(handle_health))
            .route("/upload-test", post(handle_upload))
            .route("/videos", get(handle_list_videos))
            .layer(DefaultBodyLimit::max(self.config.max_upload_bytes))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn start<F>(&self, shutdown: F) -> CamTestResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> CamTestResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::fs::create_dir_all(&self.config.storage_dir).await?;
        let addr = listener.local_addr()?;

        tracing::info!("Upload server listening on {}", addr);
        tracing::info!("   Upload: POST http://{}/upload-test", addr);
        tracing::info!("   Health: GET http://{}/health", addr);
        tracing::info!("   Storage: {}", self.config.storage_dir.display());

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Upload server stopped");
        Ok(())
    }
}

async fn handle_root() -> Json<ServerInfo> {
    let endpoints = BTreeMap::from([
        ("upload".to_string(), "/upload-test".to_string()),
        ("health".to_string(), "/health".to_string()),
        ("videos".to_string(), "/videos".to_string()),
    ]);
    Json(ServerInfo {
        message: "Camera Test Server is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}

async fn handle_health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: Local::now().to_rfc3339(),
    })
}

struct IncomingVideo {
    file_name: String,
    content_type: Option<String>,
    data: bytes::Bytes,
}

async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadReceipt>, ApiError> {
    let mut video = None;
    let mut user_id = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(VIDEO_FIELD) => {
                let file_name = sanitize_file_name(field.file_name().unwrap_or_default());
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                video = Some(IncomingVideo {
                    file_name,
                    content_type,
                    data,
                });
            }
            Some(USER_ID_FIELD) => {
                user_id = Some(field.text().await?);
            }
            other => {
                tracing::debug!("Ignoring multipart field {:?}", other);
            }
        }
    }

    let video = video.ok_or(ApiError::MissingField(VIDEO_FIELD))?;
    let filename = format!(
        "{}_{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        video.file_name
    );
    let path = state.storage_dir.join(&filename);

    tracing::info!("📥 Receiving video upload: {}", filename);
    if let Some(user_id) = &user_id {
        tracing::info!("👤 User ID: {}", user_id);
    }

    let size_bytes = video.data.len() as u64;
    tracing::info!("📦 File size: {:.2} MB", bytes_to_mb(size_bytes));
    tracing::info!("📹 Content type: {:?}", video.content_type);

    tokio::fs::write(&path, &video.data).await?;
    tracing::info!("✅ Video saved: {}", path.display());

    let has_audio = guess_has_audio(video.content_type.as_deref(), size_bytes);

    Ok(Json(UploadReceipt {
        status: Some("success".to_string()),
        filename: Some(filename),
        size_bytes,
        size_mb: Some(bytes_to_mb(size_bytes)),
        content_type: video.content_type,
        user_id,
        has_audio: Some(has_audio.to_string()),
        timestamp: Some(Local::now().to_rfc3339()),
        saved_path: Some(path.display().to_string()),
    }))
}

async fn handle_list_videos(
    State(state): State<AppState>,
) -> Result<Json<VideoListing>, ApiError> {
    let mut videos = Vec::new();
    let mut entries = tokio::fs::read_dir(state.storage_dir.as_ref()).await?;
    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        videos.push(StoredVideo {
            filename: entry.file_name().to_string_lossy().into_owned(),
            size_bytes: metadata.len(),
            size_mb: bytes_to_mb(metadata.len()),
        });
    }
    videos.sort_by(|a, b| a.filename.cmp(&b.filename));

    Ok(Json(VideoListing {
        status: "success".to_string(),
        count: videos.len(),
        videos,
    }))
}

/// Keep only the final path component of a client supplied file name
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    match base {
        "" | "." | ".." => "upload.bin".to_string(),
        base => Path::new(base)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string()),
    }
}

fn guess_has_audio(content_type: Option<&str>, size_bytes: u64) -> &'static str {
    match content_type {
        Some(ct) if ct.contains("webm") => {
            if size_bytes > AUDIO_SIZE_THRESHOLD {
                "likely"
            } else {
                "unlikely"
            }
        }
        _ => "unknown",
    }
}
