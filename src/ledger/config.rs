//! Configuration for the request ledger.

use serde::{Deserialize, Serialize};

/// Retention and derivation limits for the request ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Maximum retained records; oldest are dropped first
    pub capacity: usize,
    /// Number of recent successful records averaged for latency
    pub latency_window: usize,
    /// Consecutive errors before the endpoint is reported disconnected
    pub disconnect_threshold: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            latency_window: 10,
            disconnect_threshold: 3,
        }
    }
}
