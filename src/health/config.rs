//! Configuration for the health prober.

use serde::{Deserialize, Serialize};

/// Configuration for periodic endpoint probing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Whether the prober is started by `hookwatch watch`
    pub enabled: bool,
    /// Seconds between ticks
    pub interval_seconds: u64,
    /// Probe only when nothing was registered for longer than this
    pub idle_threshold_seconds: u64,
    /// Timeout for each probe request
    pub timeout_seconds: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 60,
            idle_threshold_seconds: 30,
            timeout_seconds: 5,
        }
    }
}
