//! Session events for UI bindings

use crate::session::SessionState;
use crate::status::StatusIndicator;
use camtest_core::{ClipSource, FacingMode};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Events emitted by a [`RecordingSession`](crate::RecordingSession)
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The session moved to another state
    StateChanged {
        /// Previous state
        from: SessionState,
        /// New state
        to: SessionState,
    },
    /// Enumeration decided whether the camera switch control is shown
    SwitchAvailability {
        /// Two or more cameras present
        available: bool,
    },
    /// An encoder was opened and the countdown started
    RecordingStarted {
        /// Negotiated MIME type
        mime_type: String,
        /// Seconds on the countdown
        countdown: u32,
    },
    /// One second of recording elapsed
    CountdownTick {
        /// Seconds left
        remaining: u32,
    },
    /// A clip was staged for review
    ClipReady {
        /// Clip size in bytes
        size_bytes: usize,
        /// Clip MIME type
        mime_type: String,
        /// Where the clip came from
        source: ClipSource,
    },
    /// The status line changed
    StatusChanged {
        /// New status
        status: StatusIndicator,
    },
    /// A notice was shown
    Notice {
        /// Notice text
        message: String,
    },
    /// The server acknowledged an upload
    UploadCompleted {
        /// Bytes the server received
        size_bytes: u64,
    },
    /// An upload attempt failed
    UploadFailed {
        /// Failure description
        error: String,
    },
    /// The clip was handed to the share sheet
    Shared,
    /// The microphone track was enabled or disabled
    MicrophoneToggled {
        /// New state
        enabled: bool,
    },
    /// The camera was switched
    CameraSwitched {
        /// Camera now open
        facing_mode: FacingMode,
    },
}

impl SessionEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::StateChanged { .. } => "state_changed",
            SessionEvent::SwitchAvailability { .. } => "switch_availability",
            SessionEvent::RecordingStarted { .. } => "recording_started",
            SessionEvent::CountdownTick { .. } => "countdown_tick",
            SessionEvent::ClipReady { .. } => "clip_ready",
            SessionEvent::StatusChanged { .. } => "status_changed",
            SessionEvent::Notice { .. } => "notice",
            SessionEvent::UploadCompleted { .. } => "upload_completed",
            SessionEvent::UploadFailed { .. } => "upload_failed",
            SessionEvent::Shared => "shared",
            SessionEvent::MicrophoneToggled { .. } => "microphone_toggled",
            SessionEvent::CameraSwitched { .. } => "camera_switched",
        }
    }

    /// Check if this is an error event
    pub fn is_error_event(&self) -> bool {
        matches!(self, SessionEvent::UploadFailed { .. })
            || matches!(self, SessionEvent::StatusChanged { status } if status.kind == crate::StatusKind::Error)
    }
}

/// Stream of session events
#[derive(Debug)]
pub struct EventStream {
    receiver: mpsc::UnboundedReceiver<SessionEvent>,
}

impl EventStream {
    /// Create new event stream
    pub fn new(receiver: mpsc::UnboundedReceiver<SessionEvent>) -> Self {
        Self { receiver }
    }

    /// Get next event (async)
    pub async fn next(&mut self) -> Option<SessionEvent> {
        self.receiver.recv().await
    }

    /// Try to get next event without blocking
    pub fn try_next(&mut self) -> Result<Option<SessionEvent>, mpsc::error::TryRecvError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => {
                Err(mpsc::error::TryRecvError::Disconnected)
            }
        }
    }

    /// Drain every event queued so far
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Close the event stream
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

impl Stream for EventStream {
    type Item = SessionEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_event_stream_basic() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut stream = EventStream::new(rx);

        tx.send(SessionEvent::CountdownTick { remaining: 9 }).unwrap();
        tx.send(SessionEvent::Shared).unwrap();

        let event = stream.next().await.unwrap();
        assert_eq!(event.event_type(), "countdown_tick");
        assert_eq!(stream.try_next().unwrap(), Some(SessionEvent::Shared));
        assert_eq!(stream.try_next().unwrap(), None);

        drop(tx);
        assert!(stream.try_next().is_err());
    }

    #[tokio::test]
    async fn test_event_stream_as_stream() {
        let (tx, rx) = mpsc::unbounded_channel();
        let stream = EventStream::new(rx);

        for remaining in (0..3).rev() {
            tx.send(SessionEvent::CountdownTick { remaining }).unwrap();
        }
        drop(tx);

        let ticks: Vec<SessionEvent> = stream.collect().await;
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[2], SessionEvent::CountdownTick { remaining: 0 });
    }

    #[test]
    fn test_error_classification() {
        let failed = SessionEvent::UploadFailed {
            error: "Network error: refused".to_string(),
        };
        assert!(failed.is_error_event());

        let status = SessionEvent::StatusChanged {
            status: StatusIndicator::error("Camera access denied"),
        };
        assert!(status.is_error_event());

        let ready = SessionEvent::StatusChanged {
            status: StatusIndicator::success("Ready to record"),
        };
        assert!(!ready.is_error_event());
    }
}
