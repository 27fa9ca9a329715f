//! Caller-side instrumentation for outbound requests.
//!
//! [`dispatch`] wraps a caller's network future with the ledger bookkeeping:
//! it registers a pending record, races the call against a timeout and closes
//! the record with whichever outcome settles first. Every dispatched record
//! reaches a terminal status, including when the caller drops the future
//! before it completes.

mod error;

pub use error::*;

use crate::ledger::{RequestId, RequestLedger, RequestUpdate};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Default time a caller-issued request may take before it is recorded as failed.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Description of a call about to be made.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: String,
    pub method: String,
    pub payload: Option<Value>,
    pub category: String,
}

impl OutboundRequest {
    pub fn new(url: impl Into<String>, method: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            payload: None,
            category: category.into(),
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Result of a dispatched call, as recorded in the ledger.
#[derive(Debug)]
pub struct Dispatched {
    pub id: RequestId,
    pub duration_ms: u64,
    pub outcome: Result<Value, DispatchError>,
}

impl Dispatched {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Message recorded when an instrumented future is dropped before settling.
pub const CANCELLED_MESSAGE: &str = "request cancelled";

/// Pending ledger record that is closed as an error if dropped unsettled.
pub(crate) struct PendingRecord<'a> {
    ledger: &'a RequestLedger,
    id: RequestId,
    start: Instant,
    settled: bool,
}

impl<'a> PendingRecord<'a> {
    pub(crate) fn register(ledger: &'a RequestLedger, request: OutboundRequest) -> Self {
        let OutboundRequest {
            url,
            method,
            payload,
            category,
        } = request;
        let id = ledger.add_request(url, method, payload, category);
        Self {
            ledger,
            id,
            start: Instant::now(),
            settled: false,
        }
    }

    pub(crate) fn id(&self) -> &RequestId {
        &self.id
    }

    pub(crate) fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Close the record with `update` and disarm the guard.
    pub(crate) fn settle(mut self, update: RequestUpdate) -> RequestId {
        self.settled = true;
        self.ledger.update_request(&self.id, update);
        self.id.clone()
    }
}

impl Drop for PendingRecord<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let duration_ms = self.elapsed_ms();
        tracing::warn!(request_id = %self.id, duration_ms, "Request dropped before completion");
        self.ledger.update_request(
            &self.id,
            RequestUpdate::error(CANCELLED_MESSAGE).with_duration(duration_ms),
        );
    }
}

/// Run `call` under ledger instrumentation.
///
/// The pending record is registered before `call` is first polled. If `call`
/// does not settle within `timeout` it is dropped and the record is closed
/// with [`DispatchError::Timeout`]. If the returned future is itself dropped
/// first, the record is closed as an error with [`CANCELLED_MESSAGE`].
pub async fn dispatch<F>(
    ledger: &RequestLedger,
    request: OutboundRequest,
    timeout: Duration,
    call: F,
) -> Dispatched
where
    F: Future<Output = Result<Value, DispatchError>>,
{
    let pending = PendingRecord::register(ledger, request);

    let outcome = match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(DispatchError::Timeout(timeout.as_secs())),
    };
    let duration_ms = pending.elapsed_ms();

    let update = match &outcome {
        Ok(body) => RequestUpdate::success().with_response(body.clone()),
        Err(e) => {
            tracing::warn!(request_id = %pending.id(), error = %e, duration_ms, "Webhook request failed");
            RequestUpdate::error(e.to_string())
        }
    };
    let id = pending.settle(update.with_duration(duration_ms));

    Dispatched {
        id,
        duration_ms,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::RequestStatus;
    use serde_json::json;

    fn request() -> OutboundRequest {
        OutboundRequest::new("https://hooks.example.com/in", "POST", "text")
            .with_payload(json!({"text": "hello"}))
    }

    #[tokio::test]
    async fn test_success_closes_record() {
        let ledger = RequestLedger::default();
        let dispatched = dispatch(&ledger, request(), DEFAULT_REQUEST_TIMEOUT, async {
            Ok(json!({"received": true}))
        })
        .await;

        assert!(dispatched.is_success());
        let record = ledger.get_request(&dispatched.id).unwrap();
        assert_eq!(record.status, RequestStatus::Success);
        assert_eq!(record.response, Some(json!({"received": true})));
        assert_eq!(record.payload, Some(json!({"text": "hello"})));
        assert_eq!(record.duration_ms, Some(dispatched.duration_ms));
    }

    #[tokio::test]
    async fn test_failure_closes_record() {
        let ledger = RequestLedger::default();
        let dispatched = dispatch(&ledger, request(), DEFAULT_REQUEST_TIMEOUT, async {
            Err(DispatchError::HttpError(502))
        })
        .await;

        assert!(matches!(dispatched.outcome, Err(DispatchError::HttpError(502))));
        let record = ledger.get_request(&dispatched.id).unwrap();
        assert_eq!(record.status, RequestStatus::Error);
        assert_eq!(record.error.as_deref(), Some("HTTP error: 502"));
        assert_eq!(ledger.stats().error_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_produces_terminal_error() {
        let ledger = RequestLedger::default();
        let dispatched = dispatch(&ledger, request(), DEFAULT_REQUEST_TIMEOUT, async {
            std::future::pending::<Result<Value, DispatchError>>().await
        })
        .await;

        assert!(matches!(dispatched.outcome, Err(DispatchError::Timeout(15))));
        assert_eq!(dispatched.duration_ms, 15_000);

        let record = ledger.get_request(&dispatched.id).unwrap();
        assert_eq!(record.status, RequestStatus::Error);
        assert_eq!(record.error.as_deref(), Some("request timed out after 15s"));

        let stats = ledger.stats();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.completed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_dispatch_closes_record() {
        let ledger = RequestLedger::default();
        let outer = tokio::time::timeout(
            Duration::from_millis(50),
            dispatch(&ledger, request(), DEFAULT_REQUEST_TIMEOUT, async {
                std::future::pending::<Result<Value, DispatchError>>().await
            }),
        )
        .await;
        assert!(outer.is_err());

        let records = ledger.recent_requests(10);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RequestStatus::Error);
        assert_eq!(records[0].error.as_deref(), Some(CANCELLED_MESSAGE));
        assert_eq!(records[0].duration_ms, Some(50));

        let stats = ledger.stats();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.completed(), 1);
        assert_eq!(stats.error_count, 1);
    }

    #[tokio::test]
    async fn test_settled_record_not_closed_again() {
        let ledger = RequestLedger::default();
        dispatch(&ledger, request(), DEFAULT_REQUEST_TIMEOUT, async { Ok(Value::Null) }).await;

        let stats = ledger.stats();
        assert_eq!(stats.success_count, 1);
        assert_eq!(stats.error_count, 0);
    }
}
