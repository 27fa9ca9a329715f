//! Webhook sender.
//!
//! Posts JSON payloads to the webhook endpoint through [`crate::dispatch`], so
//! every delivery attempt is recorded in the ledger under the payload's
//! category.

mod config;
mod payload;

pub use config::*;
pub use payload::*;

use crate::dispatch::{dispatch, DispatchError, Dispatched, OutboundRequest};
use crate::ledger::RequestLedger;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Sends payloads to the webhook endpoint and records each attempt.
pub struct WebhookSender {
    ledger: Arc<RequestLedger>,
    client: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookSender {
    pub fn new(ledger: Arc<RequestLedger>, config: WebhookConfig) -> Self {
        Self::with_client(ledger, config, reqwest::Client::new())
    }

    /// Create a sender with a custom HTTP client (for testing).
    pub fn with_client(
        ledger: Arc<RequestLedger>,
        config: WebhookConfig,
        client: reqwest::Client,
    ) -> Self {
        Self {
            ledger,
            client,
            config,
        }
    }

    /// Build a payload stamped with the configured source.
    pub fn payload(&self, category: impl Into<String>, data: Value) -> WebhookPayload {
        WebhookPayload::new(category, data).with_source(&self.config.source)
    }

    /// POST `payload` as JSON to `url`.
    ///
    /// An empty URL is rejected without touching the ledger.
    pub async fn send(&self, url: &str, payload: &WebhookPayload) -> Result<Dispatched, DispatchError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DispatchError::Rejected(
                "webhook URL is not configured".to_string(),
            ));
        }

        let body = serde_json::to_value(payload)
            .map_err(|e| DispatchError::Rejected(format!("payload is not serializable: {}", e)))?;

        tracing::info!(url = %url, category = %payload.category, "Sending webhook");

        let request = OutboundRequest::new(url, "POST", payload.category.clone())
            .with_payload(body.clone());
        let call = async {
            let response = self.client.post(url).json(&body).send().await?;
            let status = response.status();
            let text = response.text().await?;

            if !status.is_success() {
                return Err(DispatchError::HttpError(status.as_u16()));
            }
            Ok::<_, DispatchError>(parse_body(text))
        };

        let dispatched = dispatch(&self.ledger, request, self.timeout(), call).await;
        if dispatched.is_success() {
            tracing::info!(
                request_id = %dispatched.id,
                duration_ms = dispatched.duration_ms,
                "Webhook delivered"
            );
        }
        Ok(dispatched)
    }

    /// Send the canned connectivity-test payload.
    pub async fn test_connection(&self, url: &str) -> Result<Dispatched, DispatchError> {
        let payload = WebhookPayload::connectivity_test().with_source(&self.config.source);
        self.send(url, &payload).await
    }

    /// Send to the configured URL.
    pub async fn send_configured(&self, payload: &WebhookPayload) -> Result<Dispatched, DispatchError> {
        let url = self.config.url.clone().unwrap_or_default();
        self.send(&url, payload).await
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }
}

/// JSON bodies are kept structured; anything else is stored as a string.
fn parse_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}
