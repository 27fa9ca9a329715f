//! Outgoing webhook payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Category of the connectivity-test payload.
pub const TEST_CATEGORY: &str = "test";

/// JSON body posted to the webhook endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub source: String,
    /// Also used as the ledger category of the delivery
    pub category: String,
    pub data: Value,
}

impl WebhookPayload {
    /// New payload with a fresh session id.
    pub fn new(category: impl Into<String>, data: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            session_id: uuid::Uuid::new_v4().to_string(),
            source: "hookwatch".to_string(),
            category: category.into(),
            data,
        }
    }

    /// Payload used to check that the endpoint accepts deliveries.
    pub fn connectivity_test() -> Self {
        Self::new(
            TEST_CATEGORY,
            json!({ "test": true, "message": "hookwatch connectivity test" }),
        )
        .with_session("test-session")
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}
