//! Error types for health probes.

use thiserror::Error;

/// Ways a probe can fail. Recorded in the ledger as the error message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// Request timeout
    #[error("request timeout after {0}s")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Non-success HTTP status
    #[error("HTTP error: {0}")]
    HttpError(u16),
}

impl ProbeError {
    /// Classify a reqwest error.
    pub fn from_reqwest(e: reqwest::Error, timeout_seconds: u64) -> Self {
        if e.is_timeout() {
            ProbeError::Timeout(timeout_seconds)
        } else {
            ProbeError::ConnectionFailed(e.to_string())
        }
    }
}
