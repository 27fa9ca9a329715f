//! Configuration module for hookwatch
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`HOOKWATCH_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use hookwatch::config::MonitorConfig;
//!
//! let config = MonitorConfig::default();
//! assert_eq!(config.ledger.capacity, 50);
//!
//! let toml = r#"
//! [webhook]
//! url = "https://hooks.example.com/in"
//! "#;
//! let config: MonitorConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.webhook.url.as_deref(), Some("https://hooks.example.com/in"));
//! ```

pub mod error;
pub mod logging;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};

// Section types live next to the components they configure
pub use crate::health::HealthCheckConfig;
pub use crate::ledger::LedgerConfig;
pub use crate::webhook::WebhookConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for hookwatch.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Webhook endpoint settings
    pub webhook: WebhookConfig,
    /// Request history retention and statistics
    pub ledger: LedgerConfig,
    /// Health probe scheduling
    pub health_check: HealthCheckConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl MonitorConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("HOOKWATCH_WEBHOOK_URL") {
            if !url.trim().is_empty() {
                self.webhook.url = Some(url);
            }
        }

        if let Ok(level) = std::env::var("HOOKWATCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("HOOKWATCH_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(health) = std::env::var("HOOKWATCH_HEALTH_CHECK") {
            self.health_check.enabled = health.to_lowercase() == "true";
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.webhook.url {
            if url.trim().is_empty() {
                return Err(validation("webhook.url", "URL cannot be empty"));
            }
        }
        if self.webhook.timeout_seconds == 0 {
            return Err(validation("webhook.timeout_seconds", "must be non-zero"));
        }

        if self.ledger.capacity == 0 {
            return Err(validation("ledger.capacity", "must be non-zero"));
        }
        if self.ledger.latency_window == 0 {
            return Err(validation("ledger.latency_window", "must be non-zero"));
        }
        if self.ledger.disconnect_threshold == 0 {
            return Err(validation("ledger.disconnect_threshold", "must be non-zero"));
        }

        if self.health_check.interval_seconds == 0 {
            return Err(validation("health_check.interval_seconds", "must be non-zero"));
        }
        if self.health_check.timeout_seconds == 0 {
            return Err(validation("health_check.timeout_seconds", "must be non-zero"));
        }

        Ok(())
    }
}

fn validation(field: &str, message: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}
