//! Recording session state machine
//!
//! [`RecordingSession`] owns the stream, the recorder, the countdown and the
//! staged clip. Every user action is one method; suspending methods never
//! overlap because they all take `&mut self`.

use crate::config::SessionConfig;
use crate::countdown::Countdown;
use crate::environment::Environment;
use crate::event::{EventStream, SessionEvent};
use crate::host::{Host, HostShell, ImpactStyle, NotificationKind, ThemeVariables};
use crate::share::{ShareOutcome, ShareSheet, SharedFile, SHARE_TEXT, SHARE_TITLE};
use crate::status::{Notice, Notifier, StatusIndicator};
use bytes::Bytes;
use camtest_core::{
    bytes_to_mb, count_video_inputs, CamTestError, CamTestResult, CaptureDevice, FacingMode,
    RecordedClip,
};
use camtest_media::{EncoderBackend, MediaDeviceGateway, MediaStream, Recorder, RecorderStats};
use camtest_upload::{HttpUploadClient, ServerAck, UploadClient, UploadMetadata};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Lifecycle state of a [`RecordingSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No usable stream
    Idle,
    /// Stream open, ready to record
    DeviceReady,
    /// Encoder running, countdown active
    Recording,
    /// A clip is staged for preview, upload or share
    Reviewing,
    /// Upload in flight
    Uploading,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "Idle",
            SessionState::DeviceReady => "DeviceReady",
            SessionState::Recording => "Recording",
            SessionState::Reviewing => "Reviewing",
            SessionState::Uploading => "Uploading",
        };
        f.write_str(s)
    }
}

/// Fluent builder for [`RecordingSession`]
#[derive(Default)]
pub struct RecordingSessionBuilder {
    config: SessionConfig,
    gateway: Option<Arc<dyn MediaDeviceGateway>>,
    encoder_backend: Option<Arc<dyn EncoderBackend>>,
    upload_client: Option<Arc<dyn UploadClient>>,
    host: Host,
    share_sheet: Option<Arc<dyn ShareSheet>>,
}

impl RecordingSessionBuilder {
    /// Builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the recording length
    pub fn countdown_secs(mut self, secs: u32) -> Self {
        self.config.countdown_secs = secs;
        self
    }

    /// Set the upload endpoint used when no upload client is supplied
    pub fn upload_url(mut self, url: &str) -> Self {
        self.config.upload_url = url.to_string();
        self
    }

    /// Capture API (required)
    pub fn gateway(mut self, gateway: Arc<dyn MediaDeviceGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Encoder factory (required)
    pub fn encoder_backend(mut self, backend: Arc<dyn EncoderBackend>) -> Self {
        self.encoder_backend = Some(backend);
        self
    }

    /// Upload client; defaults to HTTP against the configured URL
    pub fn upload_client(mut self, client: Arc<dyn UploadClient>) -> Self {
        self.upload_client = Some(client);
        self
    }

    /// Embedding host shell
    pub fn host_shell(mut self, shell: Arc<dyn HostShell>) -> Self {
        self.host = Host::new(shell);
        self
    }

    /// Native share sheet
    pub fn share_sheet(mut self, sheet: Arc<dyn ShareSheet>) -> Self {
        self.share_sheet = Some(sheet);
        self
    }

    /// Build the session in [`SessionState::Idle`]
    pub fn build(self) -> CamTestResult<RecordingSession> {
        let gateway = self
            .gateway
            .ok_or_else(|| CamTestError::MissingConfiguration {
                field: "gateway".to_string(),
            })?;
        let encoder_backend =
            self.encoder_backend
                .ok_or_else(|| CamTestError::MissingConfiguration {
                    field: "encoder_backend".to_string(),
                })?;
        let upload_client = self.upload_client.unwrap_or_else(|| {
            Arc::new(HttpUploadClient::new(&self.config.upload_url)) as Arc<dyn UploadClient>
        });

        let (event_tx, _) = mpsc::unbounded_channel();

        Ok(RecordingSession {
            facing_mode: self.config.initial_facing_mode,
            notifier: Notifier::new(self.config.notice_duration),
            theme: self.host.theme(),
            config: self.config,
            gateway,
            recorder: Recorder::new(encoder_backend),
            uploader: upload_client,
            host: self.host,
            share_sheet: self.share_sheet,
            state: SessionState::Idle,
            halted: false,
            devices: Vec::new(),
            stream: None,
            staged_clip: None,
            countdown: None,
            microphone_enabled: true,
            event_tx,
        })
    }
}

/// One camera test session
pub struct RecordingSession {
    config: SessionConfig,
    gateway: Arc<dyn MediaDeviceGateway>,
    recorder: Recorder,
    uploader: Arc<dyn UploadClient>,
    host: Host,
    share_sheet: Option<Arc<dyn ShareSheet>>,
    state: SessionState,
    halted: bool,
    facing_mode: FacingMode,
    devices: Vec<CaptureDevice>,
    stream: Option<MediaStream>,
    staged_clip: Option<RecordedClip>,
    countdown: Option<Countdown>,
    microphone_enabled: bool,
    notifier: Notifier,
    theme: ThemeVariables,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl RecordingSession {
    /// Start building a session
    pub fn builder() -> RecordingSessionBuilder {
        RecordingSessionBuilder::new()
    }

    /// Subscribe to session events
    ///
    /// A new subscription closes the previous one.
    pub fn events(&mut self) -> EventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.event_tx = tx;
        EventStream::new(rx)
    }

    /// Attach to the host, check the environment and acquire devices
    ///
    /// An insecure context or a missing capture API halts the session: the
    /// error is reported and no device is ever requested.
    pub async fn initialize(&mut self, env: &Environment) -> CamTestResult<()> {
        info!("🚀 Initializing camera test session");
        self.host.ready();
        self.theme = self.host.theme();

        if let Err(e) = env.require_secure_context() {
            self.halted = true;
            self.report_error(&e, "HTTPS connection required");
            return Err(e);
        }
        if !self.gateway.is_supported() {
            let e = CamTestError::CaptureUnsupported {
                reason: "no capture API on this host".to_string(),
            };
            self.halted = true;
            self.report_error(&e, "Browser does not support the camera");
            return Err(e);
        }

        self.acquire_devices().await
    }

    /// Enumerate devices and open a stream for the current facing mode
    ///
    /// Idle -> DeviceReady. Also re-acquires from DeviceReady, releasing the
    /// old stream first.
    pub async fn acquire_devices(&mut self) -> CamTestResult<()> {
        self.ensure_not_halted()?;
        if !matches!(self.state, SessionState::Idle | SessionState::DeviceReady) {
            return Err(self.invalid_state("Idle or DeviceReady"));
        }

        info!("🎥 Requesting camera access...");
        let devices = match self.gateway.enumerate().await {
            Ok(devices) => devices,
            Err(e) => {
                self.report_error(&e, "Camera access denied");
                let fallback = self.fallback_state();
                self.transition(fallback);
                return Err(e);
            }
        };
        self.update_devices(devices);

        if let Err(e) = self.open_stream().await {
            self.report_error(&e, "Camera access denied");
            let fallback = self.fallback_state();
            self.transition(fallback);
            return Err(e);
        }

        self.set_status(StatusIndicator::success("Ready to record"));
        self.transition(SessionState::DeviceReady);
        Ok(())
    }

    /// Open an encoder on the live stream and start the countdown
    ///
    /// A no-op while already recording.
    pub async fn start_recording(&mut self) -> CamTestResult<()> {
        if self.state == SessionState::Recording {
            debug!("Recording already in progress");
            return Ok(());
        }
        if self.state != SessionState::DeviceReady {
            return Err(self.invalid_state("DeviceReady"));
        }
        let Some(stream) = self.stream.as_ref() else {
            return Err(self.invalid_state("an open stream"));
        };

        info!("🔴 Starting recording...");
        let options = self.config.recorder_options();
        let mime_type = match self.recorder.start(stream, &options).await {
            Ok(mime_type) => mime_type,
            Err(e) => {
                self.report_error(&e, "Recording failed to start");
                return Err(e);
            }
        };

        let secs = self.config.countdown_secs;
        self.countdown = Some(Countdown::start(secs));
        self.set_status(StatusIndicator::recording("Recording..."));
        self.emit(SessionEvent::RecordingStarted {
            mime_type,
            countdown: secs,
        });
        self.transition(SessionState::Recording);
        Ok(())
    }

    /// Wait for the next countdown tick
    ///
    /// Fires a light haptic per tick and stops the recording when the
    /// countdown reaches zero. An encoder failure ends the recording right
    /// away, without waiting for the countdown.
    ///
    /// Returns `None` when no countdown is active or the recording ended on
    /// an encoder failure. Dropping the future while it waits is safe;
    /// dropping it during an auto-stop is not.
    pub async fn next_tick(&mut self) -> Option<u32> {
        let countdown = self.countdown.as_mut()?;
        let recorder = &self.recorder;
        let tick = tokio::select! {
            biased;
            _ = recorder.encoder_failed() => None,
            remaining = countdown.tick() => Some(remaining),
        };

        let Some(remaining) = tick else {
            warn!("Encoder failed, ending the recording early");
            self.stop_recording().await;
            return None;
        };

        debug!("⏱️ {}s left", remaining);
        self.host.impact(ImpactStyle::Light);
        self.emit(SessionEvent::CountdownTick { remaining });

        if remaining == 0 {
            info!("⏰ Countdown finished");
            self.stop_recording().await;
        }
        Some(remaining)
    }

    /// Tick until the countdown expires and the recording stops
    pub async fn run_countdown(&mut self) {
        while let Some(remaining) = self.next_tick().await {
            if remaining == 0 {
                break;
            }
        }
    }

    /// Cancel the countdown and finalize the recording
    ///
    /// Recording -> Reviewing when any data was captured, otherwise back to
    /// DeviceReady with the failure reported. A no-op when not recording.
    pub async fn stop_recording(&mut self) {
        if self.state != SessionState::Recording {
            debug!("Not recording, nothing to stop");
            return;
        }

        info!("⏹️ Stopping recording...");
        self.countdown = None;
        let mime_type = self.recorder.mime_type().unwrap_or_default().to_string();
        let (clip, failure) = match self.recorder.stop().await {
            Some(finalized) => (finalized.clip, finalized.error),
            None => (None, None),
        };

        if let Some(e) = &failure {
            warn!("Encoder failed during recording: {}", e);
            self.report_error(e, "Recording error");
        }

        match clip {
            Some(clip) => {
                if failure.is_none() {
                    self.set_status(StatusIndicator::success("Recording finished"));
                }
                self.stage_clip(clip);
            }
            None => {
                if failure.is_none() {
                    let e = CamTestError::Encoder {
                        mime_type,
                        reason: "no data was captured".to_string(),
                    };
                    self.report_error(&e, "Recording error");
                }
                let fallback = self.fallback_state();
                self.transition(fallback);
            }
        }
    }

    /// Stage a file picked from local storage, bypassing the recorder
    pub fn select_clip(
        &mut self,
        file_name: &str,
        mime_type: &str,
        data: Bytes,
    ) -> CamTestResult<()> {
        if matches!(self.state, SessionState::Recording | SessionState::Uploading) {
            return Err(self.invalid_state("Idle, DeviceReady or Reviewing"));
        }

        info!("📁 File selected from gallery: {}", file_name);
        let clip = RecordedClip::from_file(file_name, mime_type, data);
        self.host.impact(ImpactStyle::Light);
        self.stage_clip(clip);
        Ok(())
    }

    /// Upload the staged clip
    ///
    /// Reviewing -> Uploading -> Reviewing. The clip stays staged whatever
    /// the outcome, so a failed upload can simply be repeated.
    pub async fn upload(&mut self) -> CamTestResult<ServerAck> {
        if self.state != SessionState::Reviewing {
            return Err(self.invalid_state("Reviewing"));
        }
        let Some(clip) = self.staged_clip.clone() else {
            return Err(self.invalid_state("a staged clip"));
        };
        let metadata = UploadMetadata {
            user_id: self.host.user_id(),
        };

        self.transition(SessionState::Uploading);
        self.set_status(StatusIndicator::recording("Uploading to server..."));

        let result = self.uploader.upload(&clip, &metadata).await;
        self.transition(SessionState::Reviewing);

        match result {
            Ok(ack) => {
                let message = format!(
                    "✅ Video uploaded! Size: {:.2} MB",
                    bytes_to_mb(ack.size_bytes)
                );
                self.set_status(StatusIndicator::success(&message));
                self.host.notify(NotificationKind::Success);
                self.emit(SessionEvent::UploadCompleted {
                    size_bytes: ack.size_bytes,
                });
                Ok(ack)
            }
            Err(e) => {
                self.report_error(&e, "Upload to server failed");
                self.host.notify(NotificationKind::Error);
                self.emit(SessionEvent::UploadFailed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Hand the staged clip to the native share sheet
    pub async fn share(&mut self) -> CamTestResult<ShareOutcome> {
        let Some(clip) = self.staged_clip.as_ref() else {
            return Err(self.invalid_state("a staged clip"));
        };
        let Some(sheet) = self.share_sheet.clone().filter(|s| s.can_share()) else {
            debug!("No share sheet available");
            return Ok(ShareOutcome::Unavailable);
        };

        info!("💾 Sharing video...");
        let file = SharedFile::from_clip(clip, chrono::Utc::now().timestamp_millis());
        match sheet.share(file, SHARE_TITLE, SHARE_TEXT).await {
            Ok(ShareOutcome::Shared) => {
                info!("✅ Share successful");
                self.host.notify(NotificationKind::Success);
                self.emit(SessionEvent::Shared);
                Ok(ShareOutcome::Shared)
            }
            Ok(outcome) => {
                debug!("Share sheet dismissed");
                Ok(outcome)
            }
            Err(e) => {
                error!("❌ Share error: {}", e);
                Err(e)
            }
        }
    }

    /// Discard the staged clip and go back to the camera
    pub fn retake(&mut self) -> CamTestResult<()> {
        if self.state != SessionState::Reviewing {
            return Err(self.invalid_state("Reviewing"));
        }

        self.staged_clip = None;
        info!("🔁 Clip discarded");
        let next = self.fallback_state();
        if next == SessionState::DeviceReady {
            self.set_status(StatusIndicator::success("Ready to record"));
        }
        self.transition(next);
        Ok(())
    }

    /// Flip between front and rear camera
    ///
    /// Silently ignored with fewer than two cameras. An active recording is
    /// discarded and a staged clip dropped. On failure the facing mode is
    /// restored and the session falls back to Idle, the old stream having
    /// been released before the new one was requested.
    pub async fn switch_camera(&mut self) -> CamTestResult<()> {
        if !self.can_switch_camera() {
            debug!("Fewer than two cameras, ignoring switch");
            return Ok(());
        }
        self.ensure_not_halted()?;
        if self.state == SessionState::Uploading {
            return Err(self.invalid_state("any state but Uploading"));
        }

        info!("🔄 Switching camera...");
        if self.state == SessionState::Recording {
            warn!("Camera switched while recording, discarding the recording");
            self.countdown = None;
            self.recorder.abort();
        }
        if self.staged_clip.take().is_some() {
            debug!("Staged clip dropped by camera switch");
        }

        let previous = self.facing_mode;
        self.facing_mode = previous.flipped();

        match self.open_stream().await {
            Ok(()) => {
                self.host.impact(ImpactStyle::Medium);
                self.emit(SessionEvent::CameraSwitched {
                    facing_mode: self.facing_mode,
                });
                self.set_status(StatusIndicator::success("Ready to record"));
                self.transition(SessionState::DeviceReady);
                Ok(())
            }
            Err(e) => {
                self.facing_mode = previous;
                self.report_error(&e, "Camera switch failed");
                let fallback = self.fallback_state();
                self.transition(fallback);
                Err(e)
            }
        }
    }

    /// Enable or disable the microphone track
    ///
    /// Returns the new state, or `None` when there is no audio track.
    pub fn toggle_microphone(&mut self) -> Option<bool> {
        let audio = self.stream.as_mut()?.audio_track_mut()?;
        let enabled = !self.microphone_enabled;
        audio.set_enabled(enabled);
        self.microphone_enabled = enabled;

        info!(
            "🎤 Microphone {}",
            if enabled { "enabled" } else { "disabled" }
        );
        self.host.impact(ImpactStyle::Medium);
        self.emit(SessionEvent::MicrophoneToggled { enabled });
        Some(enabled)
    }

    /// Stop everything and release the camera
    pub fn shutdown(&mut self) {
        self.countdown = None;
        self.recorder.abort();
        self.release_stream();
        self.staged_clip = None;
        self.transition(SessionState::Idle);
        info!("Session shut down");
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether initialization failed on an environment precondition
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Camera requested on the next acquisition
    pub fn facing_mode(&self) -> FacingMode {
        self.facing_mode
    }

    /// Seconds left on the countdown while recording
    pub fn countdown_remaining(&self) -> Option<u32> {
        self.countdown.as_ref().map(Countdown::remaining)
    }

    /// Clip staged for review
    pub fn staged_clip(&self) -> Option<&RecordedClip> {
        self.staged_clip.as_ref()
    }

    /// Live stream
    pub fn stream(&self) -> Option<&MediaStream> {
        self.stream.as_ref()
    }

    /// Devices from the last enumeration
    pub fn devices(&self) -> &[CaptureDevice] {
        &self.devices
    }

    /// Whether the camera switch control should be shown
    pub fn can_switch_camera(&self) -> bool {
        count_video_inputs(&self.devices) >= 2
    }

    /// Whether the microphone track is enabled
    pub fn is_microphone_enabled(&self) -> bool {
        self.microphone_enabled
    }

    /// Chunk statistics of the active (or last) recording
    pub fn recorder_stats(&self) -> RecorderStats {
        self.recorder.stats()
    }

    /// Persistent status line
    pub fn status(&self) -> &StatusIndicator {
        self.notifier.status()
    }

    /// Notice currently on screen
    pub fn active_notice(&self) -> Option<&Notice> {
        self.notifier.active_notice()
    }

    /// Resolved theme colours
    pub fn theme(&self) -> &ThemeVariables {
        &self.theme
    }

    fn update_devices(&mut self, devices: Vec<CaptureDevice>) {
        let cameras = count_video_inputs(&devices);
        info!("📹 Found {} camera(s)", cameras);
        self.devices = devices;
        self.emit(SessionEvent::SwitchAvailability {
            available: cameras >= 2,
        });
    }

    async fn open_stream(&mut self) -> CamTestResult<()> {
        self.release_stream();

        let constraints = self.config.constraints(self.facing_mode);
        let mut stream = self.gateway.open(&constraints).await?;
        if let Some(audio) = stream.audio_track_mut() {
            audio.set_enabled(self.microphone_enabled);
        }

        let resolution = stream.resolution();
        info!(
            "✅ Camera access granted: {} camera at {}x{}",
            self.facing_mode, resolution.width, resolution.height
        );
        debug!("📹 Video track: {}", stream.video_track().label());
        if let Some(audio) = stream.audio_track() {
            debug!("🎤 Audio track: {}", audio.label());
        }

        self.stream = Some(stream);
        Ok(())
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            self.gateway.close(&mut stream);
            debug!("Released stream {}", stream.id());
        }
    }

    fn stage_clip(&mut self, clip: RecordedClip) {
        info!("📺 Clip ready for review: {}", clip.describe());
        self.emit(SessionEvent::ClipReady {
            size_bytes: clip.size(),
            mime_type: clip.mime_type().to_string(),
            source: clip.source().clone(),
        });
        self.staged_clip = Some(clip);
        self.transition(SessionState::Reviewing);
    }

    fn fallback_state(&self) -> SessionState {
        if self.stream.as_ref().is_some_and(MediaStream::is_active) {
            SessionState::DeviceReady
        } else {
            SessionState::Idle
        }
    }

    fn report_error(&mut self, err: &CamTestError, status: &str) {
        error!("❌ {} [{}]: {}", status, err.error_code(), err);
        let message = self.notifier.show(&err.to_string()).message.clone();
        self.emit(SessionEvent::Notice { message });
        self.set_status(StatusIndicator::error(status));
    }

    fn set_status(&mut self, status: StatusIndicator) {
        if self.notifier.set_status(status.clone()) {
            self.emit(SessionEvent::StatusChanged { status });
        }
    }

    fn transition(&mut self, to: SessionState) {
        let from = self.state;
        if from == to {
            return;
        }
        info!("Session {} -> {}", from, to);
        self.state = to;
        self.emit(SessionEvent::StateChanged { from, to });
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine.
        let _ = self.event_tx.send(event);
    }

    fn ensure_not_halted(&self) -> CamTestResult<()> {
        if self.halted {
            return Err(CamTestError::InvalidState {
                expected: "initialized session".to_string(),
                actual: "halted by environment check".to_string(),
            });
        }
        Ok(())
    }

    fn invalid_state(&self, expected: &str) -> CamTestError {
        CamTestError::InvalidState {
            expected: expected.to_string(),
            actual: self.state.to_string(),
        }
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.countdown = None;
        self.release_stream();
    }
}

impl fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSession")
            .field("state", &self.state)
            .field("facing_mode", &self.facing_mode)
            .field("devices", &self.devices.len())
            .field("stream", &self.stream.as_ref().map(MediaStream::id))
            .field("staged_clip", &self.staged_clip.as_ref().map(RecordedClip::size))
            .field("countdown", &self.countdown_remaining())
            .field("recorder", &self.recorder)
            .finish()
    }
}
