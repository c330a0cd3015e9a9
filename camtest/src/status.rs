//! Status indicator and auto-dismissing notices

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Status indicator style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Nothing to report yet
    Idle,
    /// Last operation succeeded
    Success,
    /// Recording or uploading in progress
    Recording,
    /// Last operation failed
    Error,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusKind::Idle => "idle",
            StatusKind::Success => "success",
            StatusKind::Recording => "recording",
            StatusKind::Error => "error",
        };
        f.write_str(s)
    }
}

/// Persistent status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusIndicator {
    /// Style
    pub kind: StatusKind,
    /// Text
    pub message: String,
}

impl StatusIndicator {
    /// Initial status
    pub fn idle() -> Self {
        Self::new(StatusKind::Idle, "Initializing...")
    }

    /// Status of a given kind
    pub fn new(kind: StatusKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }

    /// Success status
    pub fn success(message: &str) -> Self {
        Self::new(StatusKind::Success, message)
    }

    /// In-progress status
    pub fn recording(message: &str) -> Self {
        Self::new(StatusKind::Recording, message)
    }

    /// Failure status
    pub fn error(message: &str) -> Self {
        Self::new(StatusKind::Error, message)
    }
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::idle()
    }
}

/// Transient message shown on top of the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Text
    pub message: String,
    /// When the notice disappears
    pub expires_at: Instant,
}

impl Notice {
    /// Whether the notice is still on screen at `now`
    pub fn is_visible_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Owns the status line and the current notice
#[derive(Debug, Clone)]
pub struct Notifier {
    duration: Duration,
    status: StatusIndicator,
    notice: Option<Notice>,
}

impl Notifier {
    /// Notices stay up for `duration`
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            status: StatusIndicator::idle(),
            notice: None,
        }
    }

    /// Current status
    pub fn status(&self) -> &StatusIndicator {
        &self.status
    }

    /// Replace the status; returns false when nothing changed
    pub fn set_status(&mut self, status: StatusIndicator) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        true
    }

    /// Show a notice, replacing any visible one
    pub fn show(&mut self, message: &str) -> &Notice {
        self.notice.insert(Notice {
            message: message.to_string(),
            expires_at: Instant::now() + self.duration,
        })
    }

    /// The notice on screen right now
    pub fn active_notice(&self) -> Option<&Notice> {
        let now = Instant::now();
        self.notice.as_ref().filter(|n| n.is_visible_at(now))
    }

    /// Hide the notice early
    pub fn dismiss(&mut self) {
        self.notice = None;
    }
}
