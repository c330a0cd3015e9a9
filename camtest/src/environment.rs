//! Hosting environment checks

use camtest_core::{CamTestError, CamTestResult};

/// Where the camera test is being served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Scheme, with or without the trailing colon (`"https:"`, `"http"`)
    pub protocol: String,
    /// Host name without port
    pub hostname: String,
}

impl Environment {
    /// Create an environment description
    pub fn new(protocol: &str, hostname: &str) -> Self {
        Self {
            protocol: protocol.to_string(),
            hostname: hostname.to_string(),
        }
    }

    /// Plain HTTP on localhost, the usual development setup
    pub fn localhost() -> Self {
        Self::new("http:", "localhost")
    }

    /// Scheme without the trailing colon, lowercased
    pub fn scheme(&self) -> String {
        self.protocol.trim_end_matches(':').to_ascii_lowercase()
    }

    /// Origin string used in diagnostics
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme(), self.hostname)
    }

    /// Capture APIs are only exposed over https or on localhost
    pub fn is_secure_context(&self) -> bool {
        self.scheme() == "https" || self.hostname == "localhost"
    }

    /// Fail with [`CamTestError::InsecureContext`] outside a secure context
    pub fn require_secure_context(&self) -> CamTestResult<()> {
        if self.is_secure_context() {
            Ok(())
        } else {
            Err(CamTestError::InsecureContext {
                origin: self.origin(),
            })
        }
    }
}
