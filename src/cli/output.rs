//! Output formatting helpers for CLI commands

use crate::ledger::{LedgerEvent, LedgerSnapshot, LedgerStats, RequestRecord, RequestStatus};
use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

/// Format a duration in milliseconds, `N/A` when absent.
pub fn format_duration(duration_ms: Option<u64>) -> String {
    match duration_ms {
        None | Some(0) => "N/A".to_string(),
        Some(ms) if ms < 1000 => format!("{}ms", ms),
        Some(ms) => format!("{:.1}s", ms as f64 / 1000.0),
    }
}

/// Colored label for a request status
pub fn status_label(status: RequestStatus) -> ColoredString {
    match status {
        RequestStatus::Success => "success".green(),
        RequestStatus::Error => "error".red(),
        RequestStatus::Pending => "pending".yellow(),
    }
}

fn connection_label(stats: &LedgerStats) -> ColoredString {
    if stats.is_connected {
        "Connected".green()
    } else {
        "Disconnected".red()
    }
}

/// Format statistics as a two-column table
pub fn format_stats_table(stats: &LedgerStats) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric", "Value"]);

    let success_rate = stats
        .success_rate()
        .map(|rate| format!("{:.1}%", rate * 100.0))
        .unwrap_or_else(|| "N/A".to_string());
    let timestamp = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "never".to_string())
    };

    let rows = vec![
        ("Status", connection_label(stats).to_string()),
        ("Total requests", stats.total_requests.to_string()),
        ("Successful", stats.success_count.to_string()),
        ("Failed", stats.error_count.to_string()),
        ("Success rate", success_rate),
        (
            "Average latency",
            format_duration(Some(stats.average_latency_ms)),
        ),
        ("Consecutive errors", stats.consecutive_errors.to_string()),
        ("Last success", timestamp(stats.last_success_at)),
        ("Last error", timestamp(stats.last_error_at)),
    ];

    for (name, value) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }

    table.to_string()
}

/// Format request records as a table, newest first
pub fn format_requests_table(records: &[RequestRecord]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Method", "Category", "Status", "Duration", "Detail"]);

    for r in records {
        let detail = r.error.clone().unwrap_or_else(|| r.id.to_string());
        table.add_row(vec![
            Cell::new(r.created_at.format("%H:%M:%S")),
            Cell::new(&r.method),
            Cell::new(&r.category),
            Cell::new(status_label(r.status)),
            Cell::new(format_duration(r.duration_ms)),
            Cell::new(detail),
        ]);
    }

    table.to_string()
}

/// Format a snapshot as pretty JSON
pub fn format_snapshot_json(snapshot: &LedgerSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}

/// One-line summary of a ledger event
pub fn format_event_line(event: &LedgerEvent) -> String {
    match event {
        LedgerEvent::RequestAdded { record, .. } => format!(
            "{} {} {} [{}]",
            "→".cyan(),
            record.method,
            record.url,
            record.category
        ),
        LedgerEvent::RequestUpdated { record, stats } => {
            let mut line = format!(
                "{} {} [{}] {} in {}",
                "←".cyan(),
                record.method,
                record.category,
                status_label(record.status),
                format_duration(record.duration_ms)
            );
            if let Some(error) = &record.error {
                line.push_str(&format!(": {}", error));
            }
            if !stats.is_connected {
                line.push_str(&format!(
                    " ({}, {} consecutive errors)",
                    connection_label(stats),
                    stats.consecutive_errors
                ));
            }
            line
        }
        LedgerEvent::Cleared { .. } => "history cleared".to_string(),
    }
}
