//! Request ledger.
//!
//! Capacity-bounded, newest-first log of calls made to the webhook endpoint,
//! together with the reliability statistics derived from it. Callers register
//! a pending record before the call and report its outcome afterwards; the
//! health prober goes through the same two operations.
//!
//! # Example
//!
//! ```
//! use hookwatch::ledger::{RequestLedger, RequestUpdate};
//!
//! let ledger = RequestLedger::default();
//! let id = ledger.add_request("https://hooks.example.com/in", "POST", None, "text");
//! ledger.update_request(&id, RequestUpdate::success().with_duration(120));
//!
//! let stats = ledger.stats();
//! assert_eq!(stats.total_requests, 1);
//! assert_eq!(stats.success_count, 1);
//! assert_eq!(stats.average_latency_ms, 120);
//! ```

mod config;
mod record;
mod stats;


pub use config::*;
pub use record::*;
pub use stats::*;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;
use tokio::time::Instant;

/// Buffered events per subscriber before it starts lagging.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Change notification published to ledger subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    RequestAdded {
        record: RequestRecord,
        stats: LedgerStats,
    },
    RequestUpdated {
        record: RequestRecord,
        stats: LedgerStats,
    },
    Cleared {
        stats: LedgerStats,
    },
}

/// Records and statistics read together under one lock.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSnapshot {
    pub requests: Vec<RequestRecord>,
    pub stats: LedgerStats,
}

#[derive(Debug, Default)]
struct LedgerState {
    /// Newest first
    records: VecDeque<RequestRecord>,
    stats: LedgerStats,
    last_activity: Option<Instant>,
}

/// Bookkeeping for webhook requests and their derived statistics.
///
/// All operations are synchronous and take the internal lock for their whole
/// duration, so concurrent callers never observe a half-applied update. The
/// ledger never performs I/O and never fails.
pub struct RequestLedger {
    config: LedgerConfig,
    state: RwLock<LedgerState>,
    events: broadcast::Sender<LedgerEvent>,
}

impl RequestLedger {
    /// Create an empty ledger.
    pub fn new(config: LedgerConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(LedgerState {
                records: VecDeque::with_capacity(config.capacity),
                ..Default::default()
            }),
            config,
            events,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Register a new pending request and return its id.
    ///
    /// The record is placed at the head of the history; records beyond the
    /// configured capacity are evicted oldest first.
    pub fn add_request(
        &self,
        url: impl Into<String>,
        method: impl Into<String>,
        payload: Option<Value>,
        category: impl Into<String>,
    ) -> RequestId {
        let record = RequestRecord::pending(url.into(), method.into(), payload, category.into());
        let id = record.id.clone();

        metrics::counter!("hookwatch_requests_total",
            "category" => record.category.clone()
        )
        .increment(1);

        let mut state = self.write();
        state.records.push_front(record.clone());
        state.records.truncate(self.config.capacity);
        state.stats.total_requests += 1;
        state.last_activity = Some(Instant::now());

        tracing::debug!(
            request_id = %id,
            method = %record.method,
            category = %record.category,
            total_requests = state.stats.total_requests,
            "Request registered"
        );

        let stats = state.stats.clone();
        drop(state);
        self.publish(LedgerEvent::RequestAdded { record, stats });

        id
    }

    /// Report the terminal outcome of a request.
    ///
    /// Unknown ids (never issued, or already evicted) are ignored. A record
    /// that is already terminal takes the new fields but is not counted a
    /// second time. The average latency is still recomputed when the
    /// overwrite adds or removes a timed success from the trailing window.
    pub fn update_request(&self, id: &RequestId, update: RequestUpdate) {
        let mut state = self.write();
        let LedgerState { records, stats, .. } = &mut *state;

        let Some(record) = records.iter_mut().find(|r| &r.id == id) else {
            tracing::debug!(request_id = %id, "Ignoring update for unknown request");
            return;
        };

        let already_terminal = record.status.is_terminal();
        let was_timed_success = record.is_timed_success();
        record.apply(&update);
        let record = record.clone();

        if already_terminal {
            if was_timed_success || record.is_timed_success() {
                stats.average_latency_ms =
                    trailing_latency(records, self.config.latency_window).unwrap_or(0);
            }
            tracing::debug!(
                request_id = %id,
                status = %record.status,
                "Request already terminal, statistics unchanged"
            );
        } else {
            let now = Utc::now();
            let transition = match &update {
                RequestUpdate::Success { duration_ms, .. } => {
                    let transition = stats.record_success(now);
                    if duration_ms.is_some() {
                        if let Some(avg) = trailing_latency(records, self.config.latency_window) {
                            stats.average_latency_ms = avg;
                        }
                    }
                    transition
                }
                RequestUpdate::Error { .. } => stats.record_error(now, &self.config),
            };

            Self::record_outcome_metrics(&record);
            tracing::debug!(
                request_id = %id,
                status = %record.status,
                duration_ms = ?record.duration_ms,
                consecutive_errors = stats.consecutive_errors,
                "Request completed"
            );

            match transition {
                Some(Transition::Lost) => tracing::warn!(
                    url = %record.url,
                    consecutive_errors = stats.consecutive_errors,
                    error = ?record.error,
                    "Webhook endpoint marked disconnected"
                ),
                Some(Transition::Restored) => tracing::info!(
                    url = %record.url,
                    "Webhook endpoint connectivity restored"
                ),
                None => {}
            }
        }

        let stats = stats.clone();
        drop(state);
        self.publish(LedgerEvent::RequestUpdated { record, stats });
    }

    /// Drop all records and reset statistics to their initial state.
    pub fn clear_history(&self) {
        let mut state = self.write();
        let dropped = state.records.len();
        *state = LedgerState::default();
        drop(state);

        tracing::info!(dropped_records = dropped, "Request history cleared");
        self.publish(LedgerEvent::Cleared {
            stats: LedgerStats::default(),
        });
    }

    /// The `count` most recently added records, newest first.
    pub fn recent_requests(&self, count: usize) -> Vec<RequestRecord> {
        self.read().records.iter().take(count).cloned().collect()
    }

    /// Retained records whose category matches exactly, newest first.
    pub fn requests_by_category(&self, category: &str) -> Vec<RequestRecord> {
        self.read()
            .records
            .iter()
            .filter(|r| r.category == category)
            .cloned()
            .collect()
    }

    pub fn get_request(&self, id: &RequestId) -> Option<RequestRecord> {
        self.read().records.iter().find(|r| &r.id == id).cloned()
    }

    pub fn stats(&self) -> LedgerStats {
        self.read().stats.clone()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.read();
        LedgerSnapshot {
            requests: state.records.iter().cloned().collect(),
            stats: state.stats.clone(),
        }
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().records.is_empty()
    }

    /// When the most recent request was registered.
    pub fn last_activity(&self) -> Option<Instant> {
        self.read().last_activity
    }

    /// Receive an event for every change made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: LedgerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn record_outcome_metrics(record: &RequestRecord) {
        metrics::counter!("hookwatch_request_outcomes_total",
            "category" => record.category.clone(),
            "status" => record.status.to_string()
        )
        .increment(1);

        if let Some(ms) = record.duration_ms {
            metrics::histogram!("hookwatch_request_duration_seconds",
                "category" => record.category.clone()
            )
            .record(ms as f64 / 1000.0);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RequestLedger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}
