//! Error types for the camera test session
//!
//! Every failure the session can surface to the user is one variant of
//! [`CamTestError`]. None of them is fatal to the process; only the
//! environment preconditions halt initialization.

use thiserror::Error;

/// Main error type for camera test operations
#[derive(Error, Debug)]
pub enum CamTestError {
    /// The user or the platform refused access to the camera/microphone
    #[error("Permission denied: {operation}")]
    PermissionDenied {
        /// Operation that was denied
        operation: String,
    },

    /// No capture device matched the request or it is in use elsewhere
    #[error("Device unavailable: {reason}")]
    DeviceUnavailable {
        /// Reason the device could not be used
        reason: String,
    },

    /// A constraint could not be satisfied by any device
    #[error("Overconstrained: {constraint} - {reason}")]
    Overconstrained {
        /// Constraint that failed
        constraint: String,
        /// Failure reason
        reason: String,
    },

    /// The encoder rejected its configuration or failed while recording
    #[error("Encoder error ({mime_type}): {reason}")]
    Encoder {
        /// MIME type the encoder was configured with
        mime_type: String,
        /// Failure reason
        reason: String,
    },

    /// Device enumeration was refused by the platform
    #[error("Device enumeration failed: {reason}")]
    Enumeration {
        /// Failure reason
        reason: String,
    },

    /// The upload request never produced an HTTP response
    #[error("Network error: {reason}")]
    Network {
        /// Failure reason
        reason: String,
    },

    /// The upload endpoint answered with a non-success status
    #[error("Server error: HTTP {status}: {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Status text or response body
        message: String,
    },

    /// The upload endpoint answered 2xx with a body that lacks the byte size
    #[error("Malformed server response: {reason}")]
    MalformedResponse {
        /// Parsing error
        reason: String,
    },

    /// Capture requires a secure transport context
    #[error("Insecure context: {origin} is neither https nor localhost")]
    InsecureContext {
        /// Origin that was rejected
        origin: String,
    },

    /// The host has no capture API at all
    #[error("Capture unsupported: {reason}")]
    CaptureUnsupported {
        /// Reason capture is unavailable
        reason: String,
    },

    /// The share sheet failed
    #[error("Share failed: {reason}")]
    Share {
        /// Failure reason
        reason: String,
    },

    /// Operation requested in a state that forbids it
    #[error("Invalid state: expected {expected}, got {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },

    /// A required collaborator or setting was not provided
    #[error("Missing configuration: {field}")]
    MissingConfiguration {
        /// Missing field
        field: String,
    },

    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Result type alias for camera test operations
pub type CamTestResult<T> = Result<T, CamTestError>;

impl CamTestError {
    /// Get error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CamTestError::PermissionDenied { .. } => "PERMISSION_DENIED",
            CamTestError::DeviceUnavailable { .. } => "DEVICE_UNAVAILABLE",
            CamTestError::Overconstrained { .. } => "OVERCONSTRAINED",
            CamTestError::Encoder { .. } => "ENCODER_ERROR",
            CamTestError::Enumeration { .. } => "ENUMERATION_ERROR",
            CamTestError::Network { .. } => "NETWORK_ERROR",
            CamTestError::Server { .. } => "SERVER_ERROR",
            CamTestError::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            CamTestError::InsecureContext { .. } => "INSECURE_CONTEXT",
            CamTestError::CaptureUnsupported { .. } => "CAPTURE_UNSUPPORTED",
            CamTestError::Share { .. } => "SHARE_FAILED",
            CamTestError::InvalidState { .. } => "INVALID_STATE",
            CamTestError::MissingConfiguration { .. } => "MISSING_CONFIGURATION",
            CamTestError::Io { .. } => "IO_ERROR",
        }
    }

    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            CamTestError::PermissionDenied { .. }
            | CamTestError::DeviceUnavailable { .. }
            | CamTestError::Overconstrained { .. }
            | CamTestError::Enumeration { .. } => ErrorCategory::Device,
            CamTestError::Encoder { .. } => ErrorCategory::Encoder,
            CamTestError::Network { .. }
            | CamTestError::Server { .. }
            | CamTestError::MalformedResponse { .. }
            | CamTestError::Share { .. } => ErrorCategory::Network,
            CamTestError::InsecureContext { .. } | CamTestError::CaptureUnsupported { .. } => {
                ErrorCategory::Environment
            }
            CamTestError::InvalidState { .. } | CamTestError::MissingConfiguration { .. } => {
                ErrorCategory::State
            }
            CamTestError::Io { .. } => ErrorCategory::Storage,
        }
    }

    /// Whether the error halts session initialization entirely
    ///
    /// Everything else leaves the session in a stable state from which the
    /// user can repeat the triggering action.
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Environment
    }

    /// HTTP status for server errors
    pub fn status(&self) -> Option<u16> {
        match self {
            CamTestError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Capture device acquisition and enumeration
    Device,
    /// Encoder negotiation and finalization
    Encoder,
    /// Upload and share transport
    Network,
    /// Host environment preconditions
    Environment,
    /// State machine guard violations
    State,
    /// Local storage
    Storage,
}
