//! Send command implementation

use crate::cli::output::{format_requests_table, format_stats_table};
use crate::cli::{load_config, SendArgs};
use crate::ledger::{LedgerSnapshot, RequestLedger};
use crate::webhook::{WebhookPayload, WebhookSender};
use serde_json::{json, Value};
use std::sync::Arc;

/// Interpret `--data`: JSON is sent as-is, anything else as `{"text": ...}`.
pub fn parse_data(data: Option<&str>) -> Value {
    match data {
        None => Value::Null,
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|_| json!({ "text": raw })),
    }
}

/// Deliver one payload and print the resulting record and statistics.
///
/// Returns an error when the delivery failed, after printing the report.
pub async fn run_send(args: SendArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(&args.config, args.url.as_deref())?;
    if let Some(timeout) = args.timeout {
        config.webhook.timeout_seconds = timeout;
    }
    crate::logging::init_tracing(&config.logging)?;

    let url = config.webhook.url.clone().unwrap_or_default();
    let ledger = Arc::new(RequestLedger::new(config.ledger.clone()));
    let sender = WebhookSender::new(Arc::clone(&ledger), config.webhook.clone());

    let payload = if args.test {
        WebhookPayload::connectivity_test().with_source(&config.webhook.source)
    } else {
        sender.payload(&args.category, parse_data(args.data.as_deref()))
    };

    let dispatched = sender.send(&url, &payload).await?;

    println!("{}", format_report(&ledger.snapshot(), args.json)?);

    match dispatched.outcome {
        Ok(_) => Ok(()),
        Err(e) => Err(format!("delivery failed: {}", e).into()),
    }
}

fn format_report(snapshot: &LedgerSnapshot, json: bool) -> Result<String, serde_json::Error> {
    if json {
        return serde_json::to_string_pretty(snapshot);
    }
    Ok(format!(
        "{}\n{}",
        format_requests_table(&snapshot.requests),
        format_stats_table(&snapshot.stats)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::RequestUpdate;

    #[test]
    fn test_parse_data_json() {
        assert_eq!(parse_data(Some(r#"{"a":1}"#)), json!({"a": 1}));
    }

    #[test]
    fn test_parse_data_plain_text() {
        assert_eq!(parse_data(Some("hello there")), json!({"text": "hello there"}));
    }

    #[test]
    fn test_parse_data_absent() {
        assert_eq!(parse_data(None), Value::Null);
    }

    #[test]
    fn test_format_report_json() {
        let ledger = RequestLedger::default();
        let id = ledger.add_request("http://h/x", "POST", None, "text");
        ledger.update_request(&id, RequestUpdate::success().with_duration(12));

        let report = format_report(&ledger.snapshot(), true).unwrap();
        let value: Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["stats"]["success_count"], 1);
        assert_eq!(value["requests"][0]["duration_ms"], 12);
    }
}
