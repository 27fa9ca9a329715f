//! CLI module for hookwatch
//!
//! # Commands
//!
//! - `watch` - Probe the webhook endpoint and report connectivity until interrupted
//! - `send` - Deliver one payload and report its outcome
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! hookwatch watch --url https://n8n.example.com/webhook/abc
//! hookwatch send --url https://n8n.example.com/webhook/abc --category text --data '{"text":"hi"}'
//! hookwatch send --test --json
//! ```

pub mod completions;
pub mod config;
pub mod output;
pub mod send;
pub mod watch;

pub use completions::handle_completions;
pub use config::handle_config_init;

use crate::config::MonitorConfig;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// hookwatch - webhook request ledger and health prober
#[derive(Parser, Debug)]
#[command(
    name = "hookwatch",
    version,
    about = "Monitor delivery and connectivity of a webhook endpoint"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe the endpoint periodically and print statistics on exit
    Watch(WatchArgs),
    /// Send a single payload to the endpoint
    Send(SendArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "hookwatch.toml")]
    pub config: PathBuf,

    /// Webhook endpoint URL
    #[arg(short, long, env = "HOOKWATCH_WEBHOOK_URL")]
    pub url: Option<String>,

    /// Seconds between prober ticks
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Probe only after this many idle seconds
    #[arg(long)]
    pub idle_threshold: Option<u64>,

    /// Send one probe immediately on start
    #[arg(long)]
    pub probe_now: bool,

    /// Number of recent requests shown on exit
    #[arg(short, long, default_value = "10")]
    pub recent: usize,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "HOOKWATCH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Output events and the final report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "hookwatch.toml")]
    pub config: PathBuf,

    /// Webhook endpoint URL
    #[arg(short, long, env = "HOOKWATCH_WEBHOOK_URL")]
    pub url: Option<String>,

    /// Category recorded for the delivery (e.g. text, audio, image, document)
    #[arg(short = 'C', long, default_value = "text")]
    pub category: String,

    /// Payload data; JSON, or plain text sent as {"text": ...}
    #[arg(short, long)]
    pub data: Option<String>,

    /// Send the connectivity test payload instead of --data
    #[arg(long, conflicts_with = "data")]
    pub test: bool,

    /// Override the request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "hookwatch.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load the config file if present, then apply env and `--url` overrides.
pub fn load_config(
    path: &Path,
    url: Option<&str>,
) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
    let mut config = if path.exists() {
        MonitorConfig::load(Some(path))?
    } else {
        MonitorConfig::default()
    };

    config = config.with_env_overrides();

    if let Some(url) = url {
        config.webhook.url = Some(url.to_string());
    }

    config.validate()?;
    Ok(config)
}
