//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use slack_notifier::{SlackConfig, DEFAULT_API_BASE};

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Connection pool size.
    pub database_pool_size: u32,
    /// Slack credentials and channel.
    pub slack: SlackConfig,
    /// Merchant directory URL; enrichment is off without it.
    pub core_database_url: Option<String>,
    /// Payment ledger URL.
    pub payment_database_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `CHURN_API_ADDR` | Server bind address | `127.0.0.1:8089` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:churn_alert.db?mode=rwc` |
    /// | `DATABASE_POOL_SIZE` | Connection pool size | `20` |
    /// | `SLACK_APP_TOKEN` | Slack bot token | (unset) |
    /// | `SLACK_CHANNEL_ID` | Slack channel | (unset) |
    /// | `SLACK_API_BASE` | Slack Web API base URL | `https://slack.com/api` |
    /// | `CORE_DATABASE_URL` | Merchant directory (PostgreSQL) | (unset) |
    /// | `PAYMENT_DATABASE_URL` | Payment ledger (PostgreSQL) | (unset) |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = get("CHURN_API_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8089".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            get("DATABASE_URL").unwrap_or_else(|| "sqlite:churn_alert.db?mode=rwc".to_string());

        let database_pool_size = match get("DATABASE_POOL_SIZE") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidPoolSize(raw))?,
            None => database::Database::DEFAULT_POOL_SIZE,
        };

        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let slack = SlackConfig::new(non_empty("SLACK_APP_TOKEN"), non_empty("SLACK_CHANNEL_ID"))
            .with_api_base(non_empty("SLACK_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()));

        Ok(Self {
            addr,
            database_url,
            database_pool_size,
            slack,
            core_database_url: non_empty("CORE_DATABASE_URL"),
            payment_database_url: non_empty("PAYMENT_DATABASE_URL"),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid CHURN_API_ADDR format")]
    InvalidAddr,

    #[error("DATABASE_POOL_SIZE must be a positive integer, got '{0}'")]
    InvalidPoolSize(String),
}
