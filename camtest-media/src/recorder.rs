//! Recording a live stream into a single clip
//!
//! A [`Recorder`] negotiates an encoder configuration, then drains the encoder
//! once per timeslice on a background task. Stopping finalizes the encoder and
//! concatenates every non-empty chunk into one [`RecordedClip`].

use crate::codecs::{degradation_order, EncoderConfig};
use crate::tracks::MediaStream;
use async_trait::async_trait;
use bytes::Bytes;
use camtest_core::{CamTestError, CamTestResult, RecordedClip};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Platform encoder factory
#[async_trait]
pub trait EncoderBackend: Send + Sync {
    /// Whether the platform claims support for a MIME type
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Open an encoder bound to the live stream.
    ///
    /// Fails with [`CamTestError::Encoder`] when the configuration is rejected.
    async fn open(
        &self,
        stream: &MediaStream,
        config: &EncoderConfig,
    ) -> CamTestResult<Box<dyn Encoder>>;
}

/// A running encoder
#[async_trait]
pub trait Encoder: Send {
    /// Data encoded since the previous call. May be empty.
    async fn request_data(&mut self) -> CamTestResult<Bytes>;

    /// Flush and close the encoder, returning trailing data
    async fn finish(&mut self) -> CamTestResult<Bytes>;
}

/// Recorder options
#[derive(Debug, Clone)]
pub struct RecorderOptions {
    /// MIME types to probe, most specific first
    pub mime_preferences: Vec<String>,
    /// Target video bitrate
    pub video_bits_per_second: u32,
    /// Interval at which encoded data is collected
    pub timeslice: Duration,
}

impl Default for RecorderOptions {
    fn default() -> Self {
        Self {
            mime_preferences: crate::codecs::default_mime_preferences(),
            video_bits_per_second: crate::codecs::DEFAULT_VIDEO_BITS_PER_SECOND,
            timeslice: Duration::from_secs(1),
        }
    }
}

/// Chunk statistics for the active recording
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecorderStats {
    /// Non-empty chunks collected so far
    pub chunks: usize,
    /// Bytes collected so far
    pub bytes: usize,
}

/// Outcome of finalizing a recording
///
/// Encoding failures do not discard what was already captured: `clip` is
/// present whenever at least one byte was collected, independently of
/// `error`.
#[derive(Debug)]
pub struct Finalized {
    /// The assembled clip, absent when nothing was captured
    pub clip: Option<RecordedClip>,
    /// First failure reported by the encoder, if any
    pub error: Option<CamTestError>,
}

struct Collected {
    chunks: Vec<Bytes>,
    error: Option<CamTestError>,
}

struct ActiveRecording {
    mime_type: String,
    stop_tx: oneshot::Sender<()>,
    failure: Arc<Notify>,
    task: JoinHandle<Collected>,
}

/// Encodes a live stream into one clip
pub struct Recorder {
    backend: Arc<dyn EncoderBackend>,
    active: Option<ActiveRecording>,
    stats: Arc<RwLock<RecorderStats>>,
}

impl Recorder {
    /// Create a recorder on top of a platform encoder factory
    pub fn new(backend: Arc<dyn EncoderBackend>) -> Self {
        Self {
            backend,
            active: None,
            stats: Arc::new(RwLock::new(RecorderStats::default())),
        }
    }

    /// Whether an encoder is open
    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// MIME type of the active recording
    pub fn mime_type(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.mime_type.as_str())
    }

    /// Statistics for the active (or last) recording
    pub fn stats(&self) -> RecorderStats {
        self.stats.read().clone()
    }

    /// Open an encoder bound to `stream` and start collecting chunks
    ///
    /// Returns the negotiated MIME type. Configurations are tried in
    /// [`degradation_order`]; the call fails only when every one of them is
    /// rejected.
    pub async fn start(
        &mut self,
        stream: &MediaStream,
        options: &RecorderOptions,
    ) -> CamTestResult<String> {
        if self.active.is_some() {
            return Err(CamTestError::InvalidState {
                expected: "recorder inactive".to_string(),
                actual: "recorder active".to_string(),
            });
        }
        if !stream.is_active() {
            return Err(CamTestError::DeviceUnavailable {
                reason: format!("stream {} has been stopped", stream.id()),
            });
        }

        let backend = Arc::clone(&self.backend);
        let candidates =
            degradation_order(&options.mime_preferences, |m| backend.is_type_supported(m));

        let mut last_error = None;
        for mime_type in candidates {
            let config = EncoderConfig {
                mime_type: mime_type.clone(),
                video_bits_per_second: options.video_bits_per_second,
            };
            match self.backend.open(stream, &config).await {
                Ok(encoder) => {
                    info!("📹 Using MIME type: {}", mime_type);
                    *self.stats.write() = RecorderStats::default();
                    let (stop_tx, stop_rx) = oneshot::channel();
                    let failure = Arc::new(Notify::new());
                    let task = tokio::spawn(collect_chunks(
                        encoder,
                        options.timeslice,
                        stop_rx,
                        Arc::clone(&failure),
                        Arc::clone(&self.stats),
                    ));
                    self.active = Some(ActiveRecording {
                        mime_type: mime_type.clone(),
                        stop_tx,
                        failure,
                        task,
                    });
                    return Ok(mime_type);
                }
                Err(e) => {
                    warn!("Encoder rejected {}: {}", mime_type, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CamTestError::Encoder {
            mime_type: String::new(),
            reason: "no encoder configuration to try".to_string(),
        }))
    }

    /// Resolves once the active encoder has failed
    ///
    /// Pending forever while the encoder is healthy or no recording is
    /// active. Cancel safe: a failure that happens while nobody waits is
    /// still reported to the next caller.
    pub async fn encoder_failed(&self) {
        match &self.active {
            Some(active) => active.failure.notified().await,
            None => std::future::pending().await,
        }
    }

    /// Finalize the encoder and assemble the clip
    ///
    /// Returns `None` when no recording is active.
    pub async fn stop(&mut self) -> Option<Finalized> {
        let active = self.active.take()?;
        // The collector may already have exited after an encoder failure.
        let _ = active.stop_tx.send(());

        let collected = match active.task.await {
            Ok(collected) => collected,
            Err(e) => Collected {
                chunks: Vec::new(),
                error: Some(CamTestError::Encoder {
                    mime_type: active.mime_type.clone(),
                    reason: format!("collector task failed: {}", e),
                }),
            },
        };

        let clip = if collected.chunks.is_empty() {
            None
        } else {
            let clip = RecordedClip::from_chunks(&collected.chunks, &active.mime_type);
            info!(
                "✅ Video clip created: {:.2} MB from {} chunks",
                clip.size_mb(),
                collected.chunks.len()
            );
            Some(clip)
        };

        Some(Finalized {
            clip,
            error: collected.error,
        })
    }

    /// Drop the active recording without assembling a clip
    pub fn abort(&mut self) {
        if let Some(active) = self.active.take() {
            warn!("Discarding recording ({})", active.mime_type);
            active.task.abort();
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.abort();
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("mime_type", &self.mime_type())
            .field("stats", &self.stats())
            .finish()
    }
}

fn push_chunk(chunks: &mut Vec<Bytes>, chunk: Bytes, stats: &RwLock<RecorderStats>) {
    if chunk.is_empty() {
        return;
    }
    debug!("📦 Chunk received: {} bytes", chunk.len());
    let mut stats = stats.write();
    stats.chunks += 1;
    stats.bytes += chunk.len();
    chunks.push(chunk);
}

async fn collect_chunks(
    mut encoder: Box<dyn Encoder>,
    timeslice: Duration,
    mut stop_rx: oneshot::Receiver<()>,
    failure: Arc<Notify>,
    stats: Arc<RwLock<RecorderStats>>,
) -> Collected {
    let mut chunks = Vec::new();
    let mut interval = tokio::time::interval_at(Instant::now() + timeslice, timeslice);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            _ = interval.tick() => match encoder.request_data().await {
                Ok(chunk) => push_chunk(&mut chunks, chunk, &stats),
                Err(e) => {
                    error!("❌ Encoder error: {}", e);
                    failure.notify_one();
                    return Collected { chunks, error: Some(e) };
                }
            },
        }
    }

    match encoder.finish().await {
        Ok(chunk) => {
            push_chunk(&mut chunks, chunk, &stats);
            Collected { chunks, error: None }
        }
        Err(e) => {
            error!("❌ Encoder failed to finalize: {}", e);
            Collected {
                chunks,
                error: Some(e),
            }
        }
    }
}
