//! Unit tests for health module.

use super::*;
use crate::ledger::RequestStatus;

fn prober() -> HealthProber {
    HealthProber::new(Arc::new(RequestLedger::default()), HealthCheckConfig::default())
}

// ============================================================================
// HealthCheckConfig Tests
// ============================================================================

#[test]
fn test_config_default_values() {
    let config = HealthCheckConfig::default();
    assert!(config.enabled);
    assert_eq!(config.interval_seconds, 60);
    assert_eq!(config.idle_threshold_seconds, 30);
    assert_eq!(config.timeout_seconds, 5);
}

#[test]
fn test_config_toml_parsing() {
    let toml = r#"
        enabled = true
        interval_seconds = 10
        idle_threshold_seconds = 5
        timeout_seconds = 2
    "#;
    let config: HealthCheckConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.interval_seconds, 10);
    assert_eq!(config.idle_threshold_seconds, 5);
    assert_eq!(config.timeout_seconds, 2);
}

#[test]
fn test_config_partial_toml() {
    let config: HealthCheckConfig = toml::from_str("enabled = false").unwrap();
    assert!(!config.enabled);
    assert_eq!(config.interval_seconds, 60); // default
}

// ============================================================================
// ProbeError Tests
// ============================================================================

#[test]
fn test_error_timeout_display() {
    assert_eq!(ProbeError::Timeout(5).to_string(), "request timeout after 5s");
}

#[test]
fn test_error_connection_display() {
    let err = ProbeError::ConnectionFailed("refused".to_string());
    assert_eq!(err.to_string(), "connection failed: refused");
}

#[test]
fn test_error_http_display() {
    assert_eq!(ProbeError::HttpError(503).to_string(), "HTTP error: 503");
}

// ============================================================================
// Idle detection
// ============================================================================

#[test]
fn test_idle_since_last_tick_without_activity() {
    let start = Instant::now();
    let now = start + Duration::from_secs(60);
    assert_eq!(idle_duration(now, start, None), Duration::from_secs(60));
}

#[test]
fn test_recent_activity_shortens_idle() {
    let start = Instant::now();
    let activity = start + Duration::from_secs(50);
    let now = start + Duration::from_secs(60);
    assert_eq!(
        idle_duration(now, start, Some(activity)),
        Duration::from_secs(10)
    );
}

#[test]
fn test_stale_activity_uses_last_tick() {
    let activity = Instant::now();
    let last_tick = activity + Duration::from_secs(30);
    let now = last_tick + Duration::from_secs(60);
    assert_eq!(
        idle_duration(now, last_tick, Some(activity)),
        Duration::from_secs(60)
    );
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_stop_when_not_started_is_noop() {
    let prober = prober();
    prober.stop();
    assert!(!prober.is_running());
}

#[tokio::test]
async fn test_start_then_stop() {
    let prober = prober();
    prober.start("http://127.0.0.1:1/hook");
    assert!(prober.is_running());

    prober.stop();
    assert!(!prober.is_running());
}

#[tokio::test]
async fn test_shutdown_when_not_started_is_noop() {
    let prober = prober();
    prober.shutdown().await;
    assert!(!prober.is_running());
}

#[tokio::test]
async fn test_shutdown_joins_idle_task() {
    let prober = prober();
    prober.start("http://127.0.0.1:1/hook");
    assert!(prober.is_running());

    prober.shutdown().await;
    assert!(!prober.is_running());
    assert!(prober.ledger.is_empty());
}

#[tokio::test]
async fn test_restart_cancels_previous_task() {
    let prober = prober();
    prober.start("http://127.0.0.1:1/first");
    let first = prober
        .slot
        .lock()
        .unwrap()
        .as_ref()
        .map(|slot| slot.cancel.clone())
        .unwrap();

    prober.start("http://127.0.0.1:1/second");

    assert!(first.is_cancelled());
    let slot = prober.slot.lock().unwrap();
    let current = slot.as_ref().unwrap();
    assert_eq!(current.url, "http://127.0.0.1:1/second");
    assert!(!current.cancel.is_cancelled());
}

#[tokio::test]
async fn test_drop_cancels_task() {
    let prober = prober();
    prober.start("http://127.0.0.1:1/hook");
    let token = prober.slot.lock().unwrap().as_ref().unwrap().cancel.clone();

    drop(prober);
    assert!(token.is_cancelled());
}

// ============================================================================
// Probing
// ============================================================================

#[tokio::test]
async fn test_probe_connection_refused_records_error() {
    let ledger = Arc::new(RequestLedger::default());
    let prober = HealthProber::new(Arc::clone(&ledger), HealthCheckConfig::default());

    let id = prober.probe_once("http://127.0.0.1:1/hook").await;

    let record = ledger.get_request(&id).unwrap();
    assert_eq!(record.status, RequestStatus::Error);
    assert_eq!(record.method, "HEAD");
    assert_eq!(record.category, HEALTH_CHECK_CATEGORY);
    assert!(record.payload.is_none());
    assert!(record.error.unwrap().starts_with("connection failed"));
    assert_eq!(ledger.stats().error_count, 1);
}
