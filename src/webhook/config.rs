//! Webhook endpoint configuration

use serde::{Deserialize, Serialize};

/// Webhook endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Endpoint URL; may also come from the CLI or `HOOKWATCH_WEBHOOK_URL`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Seconds before a caller-issued request is recorded as timed out
    pub timeout_seconds: u64,
    /// Value of the `source` field stamped on outgoing payloads
    pub source: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_seconds: 15,
            source: "hookwatch".to_string(),
        }
    }
}
