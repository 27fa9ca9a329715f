//! Request record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Category used by the health prober for its synthetic probes.
pub const HEALTH_CHECK_CATEGORY: &str = "health-check";

/// Opaque identifier for a request record.
///
/// Assigned by the ledger on insert and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub(crate) fn generate() -> Self {
        Self(format!("req-{}", uuid::Uuid::new_v4().simple()))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of a request record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Success,
    Error,
}

impl RequestStatus {
    /// Returns true for `Success` and `Error`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Success => "success",
            RequestStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// One attempted call to the webhook endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: RequestId,
    pub url: String,
    pub method: String,
    pub created_at: DateTime<Utc>,
    /// Request body snapshot; absent for probes
    pub payload: Option<Value>,
    pub status: RequestStatus,
    /// Elapsed time from issuance to the terminal transition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Display grouping label (e.g. "text", "audio", "health-check")
    pub category: String,
}

impl RequestRecord {
    pub(crate) fn pending(
        url: String,
        method: String,
        payload: Option<Value>,
        category: String,
    ) -> Self {
        Self {
            id: RequestId::generate(),
            url,
            method,
            created_at: Utc::now(),
            payload,
            status: RequestStatus::Pending,
            duration_ms: None,
            response: None,
            error: None,
            category,
        }
    }

    /// Successful with a measured duration, so it counts toward latency.
    pub(crate) fn is_timed_success(&self) -> bool {
        self.status == RequestStatus::Success && self.duration_ms.is_some()
    }

    /// Overwrite the outcome fields with `update`.
    ///
    /// Success clears `error` and error clears `response`, so a record never
    /// carries both.
    pub(crate) fn apply(&mut self, update: &RequestUpdate) {
        match update {
            RequestUpdate::Success {
                duration_ms,
                response,
            } => {
                self.status = RequestStatus::Success;
                self.duration_ms = *duration_ms;
                self.response = response.clone();
                self.error = None;
            }
            RequestUpdate::Error { duration_ms, error } => {
                self.status = RequestStatus::Error;
                self.duration_ms = *duration_ms;
                self.response = None;
                self.error = Some(error.clone());
            }
        }
    }
}

/// Terminal outcome reported back into the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestUpdate {
    Success {
        duration_ms: Option<u64>,
        response: Option<Value>,
    },
    Error {
        duration_ms: Option<u64>,
        error: String,
    },
}

impl RequestUpdate {
    /// Successful outcome with no response body.
    pub fn success() -> Self {
        RequestUpdate::Success {
            duration_ms: None,
            response: None,
        }
    }

    /// Failed outcome with a human-readable description.
    pub fn error(message: impl Into<String>) -> Self {
        RequestUpdate::Error {
            duration_ms: None,
            error: message.into(),
        }
    }

    pub fn with_duration(mut self, ms: u64) -> Self {
        match &mut self {
            RequestUpdate::Success { duration_ms, .. } | RequestUpdate::Error { duration_ms, .. } => {
                *duration_ms = Some(ms)
            }
        }
        self
    }

    /// Attach a response body. Ignored on error outcomes.
    pub fn with_response(mut self, body: Value) -> Self {
        if let RequestUpdate::Success { response, .. } = &mut self {
            *response = Some(body);
        }
        self
    }
}
