//! Health probing for the webhook endpoint.
//!
//! A background task that wakes on a fixed period and, when the endpoint has
//! been idle for longer than the configured threshold, sends a `HEAD` probe.
//! Probes are recorded through the ordinary ledger operations under the
//! `health-check` category, so connectivity loss surfaces in the ledger's
//! statistics even when no caller traffic is flowing.

mod config;
mod error;

#[cfg(test)]
mod tests;

pub use config::*;
pub use error::*;

use crate::dispatch::{OutboundRequest, PendingRecord};
use crate::ledger::{RequestId, RequestLedger, RequestUpdate, HEALTH_CHECK_CATEGORY};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Running probe task.
struct ProbeSlot {
    url: String,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Periodically probes the webhook endpoint and feeds the ledger.
pub struct HealthProber {
    ledger: Arc<RequestLedger>,
    client: reqwest::Client,
    config: HealthCheckConfig,
    slot: Mutex<Option<ProbeSlot>>,
}

impl HealthProber {
    /// Create a prober with a default HTTP client.
    pub fn new(ledger: Arc<RequestLedger>, config: HealthCheckConfig) -> Self {
        Self::with_client(ledger, config, reqwest::Client::new())
    }

    /// Create a prober with a custom HTTP client (for testing).
    pub fn with_client(
        ledger: Arc<RequestLedger>,
        config: HealthCheckConfig,
        client: reqwest::Client,
    ) -> Self {
        Self {
            ledger,
            client,
            config,
            slot: Mutex::new(None),
        }
    }

    /// Start probing `endpoint_url`.
    ///
    /// Any task started earlier by this prober is cancelled first. Must be
    /// called from within a Tokio runtime.
    pub fn start(&self, endpoint_url: impl Into<String>) {
        let url = endpoint_url.into();
        let cancel = CancellationToken::new();
        let task = self.task(url.clone());
        let handle = tokio::spawn(task.run(cancel.clone()));

        let previous = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(ProbeSlot {
                url: url.clone(),
                cancel,
                handle,
            });

        if let Some(old) = previous {
            old.cancel.cancel();
            tracing::info!(old_url = %old.url, new_url = %url, "Health prober restarted");
        }
    }

    /// Stop probing. Safe to call when not started.
    ///
    /// A probe already in flight finishes and is recorded, but this does not
    /// wait for it; use [`HealthProber::shutdown`] before reading final
    /// statistics.
    pub fn stop(&self) {
        if let Some(slot) = self.take_slot() {
            slot.cancel.cancel();
            tracing::info!(url = %slot.url, "Health prober stopped");
        }
    }

    /// Stop probing and wait for the task to exit.
    ///
    /// Once this returns, any probe that was in flight has been recorded.
    pub async fn shutdown(&self) {
        let Some(slot) = self.take_slot() else {
            return;
        };
        slot.cancel.cancel();
        if let Err(e) = slot.handle.await {
            tracing::warn!(url = %slot.url, error = %e, "Health prober task failed");
        }
        tracing::info!(url = %slot.url, "Health prober shut down");
    }

    fn take_slot(&self) -> Option<ProbeSlot> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Whether a probe task is currently scheduled.
    pub fn is_running(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|slot| !slot.handle.is_finished())
    }

    /// Probe `endpoint_url` once, outside the schedule.
    pub async fn probe_once(&self, endpoint_url: impl Into<String>) -> RequestId {
        self.task(endpoint_url.into()).probe().await
    }

    fn task(&self, url: String) -> ProbeTask {
        ProbeTask {
            ledger: Arc::clone(&self.ledger),
            client: self.client.clone(),
            config: self.config.clone(),
            url,
        }
    }
}

impl Drop for HealthProber {
    fn drop(&mut self) {
        if let Some(slot) = self
            .slot
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            slot.cancel.cancel();
        }
    }
}

/// Everything the background loop needs, owned by the spawned task.
struct ProbeTask {
    ledger: Arc<RequestLedger>,
    client: reqwest::Client,
    config: HealthCheckConfig,
    url: String,
}

impl ProbeTask {
    async fn run(self, cancel: CancellationToken) {
        let period = Duration::from_secs(self.config.interval_seconds.max(1));
        let mut last_tick = Instant::now();
        let mut interval = tokio::time::interval_at(last_tick + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            url = %self.url,
            interval_seconds = self.config.interval_seconds,
            idle_threshold_seconds = self.config.idle_threshold_seconds,
            "Health prober started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(url = %self.url, "Health prober task exiting");
                    break;
                }
                now = interval.tick() => {
                    let idle = idle_duration(now, last_tick, self.ledger.last_activity());
                    if idle > Duration::from_secs(self.config.idle_threshold_seconds) {
                        self.probe().await;
                    } else {
                        tracing::debug!(
                            idle_seconds = idle.as_secs(),
                            "Endpoint recently active, skipping probe"
                        );
                    }
                    last_tick = now;
                }
            }
        }
    }

    async fn probe(&self) -> RequestId {
        let pending = PendingRecord::register(
            &self.ledger,
            OutboundRequest::new(self.url.as_str(), "HEAD", HEALTH_CHECK_CATEGORY),
        );
        let timeout_seconds = self.config.timeout_seconds;

        let result = self
            .client
            .head(&self.url)
            .timeout(Duration::from_secs(timeout_seconds))
            .send()
            .await;
        let duration_ms = pending.elapsed_ms();

        let outcome = match result {
            Ok(response) if response.status().is_success() => Ok(()),
            Ok(response) => Err(ProbeError::HttpError(response.status().as_u16())),
            Err(e) => Err(ProbeError::from_reqwest(e, timeout_seconds)),
        };

        let update = match outcome {
            Ok(()) => {
                tracing::debug!(url = %self.url, duration_ms, "Health probe succeeded");
                RequestUpdate::success()
            }
            Err(error) => {
                tracing::warn!(url = %self.url, duration_ms, error = %error, "Health probe failed");
                RequestUpdate::error(error.to_string())
            }
        };

        pending.settle(update.with_duration(duration_ms))
    }
}

/// Time since the later of the previous tick and the last registered request.
fn idle_duration(now: Instant, last_tick: Instant, last_activity: Option<Instant>) -> Duration {
    let since = last_activity.map_or(last_tick, |activity| activity.max(last_tick));
    now.saturating_duration_since(since)
}
