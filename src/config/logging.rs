//! `[logging]` section

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Formatter installed on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Accepts the values of `HOOKWATCH_LOG_FORMAT`, case-insensitively.
impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("pretty") || value.eq_ignore_ascii_case("text") {
            Ok(LogFormat::Pretty)
        } else if value.eq_ignore_ascii_case("json") {
            Ok(LogFormat::Json)
        } else {
            Err(format!("unknown log format '{}', expected pretty or json", value))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level for every target.
    pub level: String,
    pub format: LogFormat,
    /// Per-module levels keyed by hookwatch module name (`ledger`, `health`, ...).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub component_levels: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            component_levels: BTreeMap::new(),
        }
    }
}
