// src/config.rs
// Environment-backed configuration, read once at startup and immutable after.

use anyhow::{anyhow, Context, Result};

/// Default Keepa tracking feed when KEEPA_RSS_URL is not set.
pub const DEFAULT_FEED_URL: &str = "https://rss.keepa.com/3tnsab4a9nobj82tkqi2nigo2cpcrkju";

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct Config {
    /// Slack incoming-webhook URL. Required; startup fails without it.
    pub slack_webhook_url: String,
    /// Keepa RSS feed URL.
    pub feed_url: String,
    /// HTTP listen port.
    pub port: u16,
    /// Seconds between scheduled alert checks.
    pub poll_interval_secs: u64,
    /// Default log verbosity when RUST_LOG is not set.
    pub log_level: String,
}

impl Config {
    /// Bind address is fixed; only the port is configurable.
    pub const HOST: &'static str = "0.0.0.0";

    pub fn from_env() -> Result<Self> {
        let slack_webhook_url = std::env::var("SLACK_WEBHOOK_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("SLACK_WEBHOOK_URL environment variable is required"))?;

        let feed_url = std::env::var("KEEPA_RSS_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FEED_URL.to_string());

        let port = match std::env::var("PORT") {
            Ok(v) => v
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got {v:?}"))?,
            Err(_) => DEFAULT_PORT,
        };

        let poll_interval_secs = match std::env::var("POLL_INTERVAL_SECS") {
            Ok(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("POLL_INTERVAL_SECS must be seconds, got {v:?}"))?,
            Err(_) => DEFAULT_POLL_INTERVAL_SECS,
        };

        let log_level = std::env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .to_ascii_lowercase();

        Ok(Self {
            slack_webhook_url,
            feed_url,
            port,
            poll_interval_secs,
            log_level,
        })
    }
}
