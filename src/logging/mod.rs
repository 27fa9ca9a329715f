//! Tracing setup.
//!
//! Builds the subscriber filter from [`LoggingConfig`](crate::config::LoggingConfig)
//! and installs a pretty or JSON formatter.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `EnvFilter` directives for `config`: the base level followed by one
/// `hookwatch::<module>=<level>` entry per configured component, in name order.
///
/// # Examples
///
/// ```
/// use hookwatch::config::{LogFormat, LoggingConfig};
/// use hookwatch::logging::build_filter_directives;
/// use std::collections::BTreeMap;
///
/// let mut component_levels = BTreeMap::new();
/// component_levels.insert("ledger".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels,
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,hookwatch::ledger=debug");
/// ```
pub fn build_filter_directives(config: &LoggingConfig) -> String {
    config
        .component_levels
        .iter()
        .fold(config.level.clone(), |mut filter, (component, level)| {
            filter.push_str(&format!(",hookwatch::{}={}", component, level));
            filter
        })
}

/// Initialize tracing based on configuration.
///
/// `RUST_LOG`, when set, takes precedence over the configured levels.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = build_filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}
