//! Watch command implementation

use crate::cli::output::{
    format_event_line, format_requests_table, format_snapshot_json, format_stats_table,
};
use crate::cli::{load_config, WatchArgs};
use crate::config::MonitorConfig;
use crate::health::HealthProber;
use crate::ledger::{LedgerEvent, RequestLedger};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

/// Resolve configuration for `watch`, applying CLI overrides last
pub fn load_watch_config(args: &WatchArgs) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
    let mut config = load_config(&args.config, args.url.as_deref())?;

    if let Some(interval) = args.interval {
        config.health_check.interval_seconds = interval;
    }
    if let Some(idle) = args.idle_threshold {
        config.health_check.idle_threshold_seconds = idle;
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Run the prober until SIGINT/SIGTERM, then print the report
pub async fn run_watch(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_watch_config(&args)?;
    crate::logging::init_tracing(&config.logging)?;

    let url = config
        .webhook
        .url
        .clone()
        .ok_or("no webhook URL configured; pass --url or set HOOKWATCH_WEBHOOK_URL")?;

    let ledger = Arc::new(RequestLedger::new(config.ledger.clone()));
    let prober = HealthProber::new(Arc::clone(&ledger), config.health_check.clone());
    let cancel_token = CancellationToken::new();

    let printer = tokio::spawn(print_events(
        ledger.subscribe(),
        args.json,
        cancel_token.clone(),
    ));

    if args.probe_now {
        prober.probe_once(url.as_str()).await;
    }

    if config.health_check.enabled {
        prober.start(url.as_str());
    } else {
        tracing::warn!("Health checks disabled, nothing will be probed");
    }

    shutdown_signal().await;

    prober.shutdown().await;
    cancel_token.cancel();
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "Event printer task failed");
    }

    let snapshot = ledger.snapshot();
    if args.json {
        println!("{}", format_snapshot_json(&snapshot)?);
    } else {
        println!("{}", format_stats_table(&snapshot.stats));
        let recent: Vec<_> = snapshot.requests.into_iter().take(args.recent).collect();
        if !recent.is_empty() {
            println!("{}", format_requests_table(&recent));
        }
    }

    Ok(())
}

async fn print_events(
    mut events: broadcast::Receiver<LedgerEvent>,
    json: bool,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            event = events.recv() => match event {
                Ok(event) => {
                    if json {
                        match serde_json::to_string(&event) {
                            Ok(line) => println!("{}", line),
                            Err(e) => tracing::warn!(error = %e, "Failed to encode event"),
                        }
                    } else {
                        println!("{}", format_event_line(&event));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event printer lagged behind");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
