//! Scripted collaborators shared by the session tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use camtest::{
    CamTestError, CamTestResult, CaptureDevice, Encoder, EncoderBackend, EncoderConfig,
    HostShell, ImpactStyle, MediaConstraints, MediaDeviceGateway, MediaStream, NotificationKind,
    RecordedClip, RecordingSession, ServerAck, ShareOutcome, ShareSheet, SharedFile, ThemeParams,
    UploadClient, UploadMetadata, UploadReceipt,
};
use camtest::{SyntheticDeviceGateway, DEFAULT_MIME_PREFERENCES};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Encoder emitting fixed-size chunks
pub struct FixedEncoder {
    chunk_size: usize,
    trailing: usize,
    fail: bool,
    emitted: Arc<Mutex<Vec<usize>>>,
}

#[async_trait]
impl Encoder for FixedEncoder {
    async fn request_data(&mut self) -> CamTestResult<Bytes> {
        if self.fail {
            return Err(CamTestError::Encoder {
                mime_type: "video/webm".to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        self.emitted.lock().push(self.chunk_size);
        Ok(Bytes::from(vec![0x42; self.chunk_size]))
    }

    async fn finish(&mut self) -> CamTestResult<Bytes> {
        if self.fail {
            return Ok(Bytes::new());
        }
        self.emitted.lock().push(self.trailing);
        Ok(Bytes::from(vec![0x43; self.trailing]))
    }
}

/// Backend handing out [`FixedEncoder`]s and counting them
pub struct FixedBackend {
    supported: Vec<String>,
    chunk_size: usize,
    trailing: usize,
    fail: bool,
    opened: AtomicUsize,
    emitted: Arc<Mutex<Vec<usize>>>,
}

impl FixedBackend {
    pub fn new(chunk_size: usize, trailing: usize) -> Self {
        Self {
            supported: DEFAULT_MIME_PREFERENCES.iter().map(|m| m.to_string()).collect(),
            chunk_size,
            trailing,
            fail: false,
            opened: AtomicUsize::new(0),
            emitted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every encoder fails on its first data request
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0, 0)
        }
    }

    /// Nothing is supported and every open is rejected
    pub fn rejecting_all() -> Self {
        Self {
            supported: Vec::new(),
            ..Self::new(0, 0)
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn emitted_total(&self) -> usize {
        self.emitted.lock().iter().sum()
    }
}

#[async_trait]
impl EncoderBackend for FixedBackend {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.supported.iter().any(|m| m == mime_type)
    }

    async fn open(
        &self,
        _stream: &MediaStream,
        config: &EncoderConfig,
    ) -> CamTestResult<Box<dyn Encoder>> {
        if !self.is_type_supported(&config.mime_type) {
            return Err(CamTestError::Encoder {
                mime_type: config.mime_type.clone(),
                reason: "not supported".to_string(),
            });
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FixedEncoder {
            chunk_size: self.chunk_size,
            trailing: self.trailing,
            fail: self.fail,
            emitted: Arc::clone(&self.emitted),
        }))
    }
}

/// Gateway whose enumeration is refused
pub struct EnumerationRefusedGateway;

#[async_trait]
impl MediaDeviceGateway for EnumerationRefusedGateway {
    async fn enumerate(&self) -> CamTestResult<Vec<CaptureDevice>> {
        Err(CamTestError::Enumeration {
            reason: "blocked by policy".to_string(),
        })
    }

    async fn open(&self, _constraints: &MediaConstraints) -> CamTestResult<MediaStream> {
        Err(CamTestError::DeviceUnavailable {
            reason: "unreachable".to_string(),
        })
    }
}

/// Host without any capture API
pub struct NoCaptureGateway;

#[async_trait]
impl MediaDeviceGateway for NoCaptureGateway {
    fn is_supported(&self) -> bool {
        false
    }

    async fn enumerate(&self) -> CamTestResult<Vec<CaptureDevice>> {
        Ok(Vec::new())
    }

    async fn open(&self, _constraints: &MediaConstraints) -> CamTestResult<MediaStream> {
        Err(CamTestError::CaptureUnsupported {
            reason: "no capture API".to_string(),
        })
    }
}

/// Upload client answering from a script and recording what it was sent
#[derive(Default)]
pub struct ScriptedUploader {
    responses: Mutex<VecDeque<CamTestResult<u64>>>,
    pub calls: Mutex<Vec<(usize, Option<String>)>>,
}

impl ScriptedUploader {
    pub fn new(responses: Vec<CamTestResult<u64>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl UploadClient for ScriptedUploader {
    async fn upload(
        &self,
        clip: &RecordedClip,
        metadata: &UploadMetadata,
    ) -> CamTestResult<ServerAck> {
        self.calls
            .lock()
            .push((clip.size(), metadata.user_id.clone()));
        let next = self.responses.lock().pop_front();
        match next {
            Some(Ok(size_bytes)) => Ok(ServerAck::from(UploadReceipt {
                status: Some("success".to_string()),
                filename: None,
                size_bytes,
                size_mb: None,
                content_type: None,
                user_id: metadata.user_id.clone(),
                has_audio: None,
                timestamp: None,
                saved_path: None,
            })),
            Some(Err(e)) => Err(e),
            None => Err(CamTestError::Network {
                reason: "no scripted response".to_string(),
            }),
        }
    }
}

/// Host shell recording every haptic
#[derive(Default)]
pub struct RecordingHost {
    pub ready_calls: AtomicUsize,
    pub expand_calls: AtomicUsize,
    pub impacts: Mutex<Vec<ImpactStyle>>,
    pub notifications: Mutex<Vec<NotificationKind>>,
}

impl RecordingHost {
    pub fn impact_count(&self, style: ImpactStyle) -> usize {
        self.impacts.lock().iter().filter(|s| **s == style).count()
    }

    pub fn notifications(&self) -> Vec<NotificationKind> {
        self.notifications.lock().clone()
    }
}

impl HostShell for RecordingHost {
    fn ready(&self) {
        self.ready_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn expand(&self) {
        self.expand_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn theme(&self) -> Option<ThemeParams> {
        Some(ThemeParams {
            bg_color: Some("#17212b".to_string()),
            ..Default::default()
        })
    }

    fn impact(&self, style: ImpactStyle) {
        self.impacts.lock().push(style);
    }

    fn notify(&self, kind: NotificationKind) {
        self.notifications.lock().push(kind);
    }

    fn user_id(&self) -> Option<String> {
        Some("42".to_string())
    }
}

/// Share sheet returning a fixed outcome
pub struct FixedShareSheet {
    pub outcome: ShareOutcome,
    pub shared: Mutex<Vec<SharedFile>>,
}

impl FixedShareSheet {
    pub fn new(outcome: ShareOutcome) -> Self {
        Self {
            outcome,
            shared: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ShareSheet for FixedShareSheet {
    async fn share(
        &self,
        file: SharedFile,
        _title: &str,
        _text: &str,
    ) -> CamTestResult<ShareOutcome> {
        self.shared.lock().push(file);
        Ok(self.outcome)
    }
}

/// Session wired to scripted collaborators
pub struct Harness {
    pub session: RecordingSession,
    pub gateway: Arc<SyntheticDeviceGateway>,
    pub backend: Arc<FixedBackend>,
    pub uploader: Arc<ScriptedUploader>,
    pub host: Arc<RecordingHost>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(
            SyntheticDeviceGateway::new(),
            FixedBackend::new(1_000, 250),
            ScriptedUploader::default(),
        )
    }

    pub fn with(
        gateway: SyntheticDeviceGateway,
        backend: FixedBackend,
        uploader: ScriptedUploader,
    ) -> Self {
        let gateway = Arc::new(gateway);
        let backend = Arc::new(backend);
        let uploader = Arc::new(uploader);
        let host = Arc::new(RecordingHost::default());

        let session = RecordingSession::builder()
            .gateway(gateway.clone())
            .encoder_backend(backend.clone())
            .upload_client(uploader.clone())
            .host_shell(host.clone())
            .build()
            .unwrap();

        Self {
            session,
            gateway,
            backend,
            uploader,
            host,
        }
    }
}

/// One front camera and a microphone
pub fn single_camera() -> SyntheticDeviceGateway {
    SyntheticDeviceGateway::with_devices(vec![
        CaptureDevice::camera("front", "Front Camera"),
        CaptureDevice::microphone("mic", "Microphone"),
    ])
}
