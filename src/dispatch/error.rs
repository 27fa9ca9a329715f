//! Error types for dispatched requests.

use thiserror::Error;

/// Ways a caller-issued webhook request can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The call did not settle before the timeout
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Endpoint answered with a non-success status
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Refused before anything was sent
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for DispatchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => DispatchError::HttpError(status.as_u16()),
            None => DispatchError::ConnectionFailed(e.to_string()),
        }
    }
}
