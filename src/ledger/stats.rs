//! Derived reliability statistics.

use super::config::LedgerConfig;
use super::record::{RequestRecord, RequestStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Aggregate statistics over every request the ledger has seen.
///
/// Counters are monotonic over the ledger's lifetime and are not reduced when
/// records are evicted from retained history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total_requests: u64,
    pub success_count: u64,
    pub error_count: u64,
    /// Rounded mean duration of the most recent successful requests
    pub average_latency_ms: u64,
    /// Error outcomes since the last success
    pub consecutive_errors: u32,
    pub is_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error_at: Option<DateTime<Utc>>,
}

impl Default for LedgerStats {
    fn default() -> Self {
        Self {
            total_requests: 0,
            success_count: 0,
            error_count: 0,
            average_latency_ms: 0,
            consecutive_errors: 0,
            is_connected: true,
            last_success_at: None,
            last_error_at: None,
        }
    }
}

/// Connectivity change caused by a terminal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Lost,
    Restored,
}

impl LedgerStats {
    /// Requests that reached a terminal status.
    pub fn completed(&self) -> u64 {
        self.success_count + self.error_count
    }

    /// Share of completed requests that succeeded, in `[0.0, 1.0]`.
    ///
    /// Returns `None` before anything completed.
    pub fn success_rate(&self) -> Option<f64> {
        match self.completed() {
            0 => None,
            n => Some(self.success_count as f64 / n as f64),
        }
    }

    pub(crate) fn record_success(&mut self, at: DateTime<Utc>) -> Option<Transition> {
        let was_connected = self.is_connected;
        self.success_count += 1;
        self.consecutive_errors = 0;
        self.last_success_at = Some(at);
        self.is_connected = true;

        (!was_connected).then_some(Transition::Restored)
    }

    pub(crate) fn record_error(
        &mut self,
        at: DateTime<Utc>,
        config: &LedgerConfig,
    ) -> Option<Transition> {
        let was_connected = self.is_connected;
        self.error_count += 1;
        self.consecutive_errors += 1;
        self.last_error_at = Some(at);

        if self.consecutive_errors >= config.disconnect_threshold {
            self.is_connected = false;
        }

        (was_connected && !self.is_connected).then_some(Transition::Lost)
    }
}

/// Rounded mean duration of the newest `window` successful records that carry
/// a duration.
///
/// `records` must be ordered newest first. Returns `None` when no record
/// qualifies.
pub fn trailing_latency(records: &VecDeque<RequestRecord>, window: usize) -> Option<u64> {
    let (sum, count) = records
        .iter()
        .filter(|r| r.status == RequestStatus::Success)
        .filter_map(|r| r.duration_ms)
        .take(window)
        .fold((0u64, 0u64), |(sum, count), d| (sum + d, count + 1));

    if count == 0 {
        return None;
    }
    Some((sum as f64 / count as f64).round() as u64)
}
