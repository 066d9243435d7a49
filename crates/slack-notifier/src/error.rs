//! Error types for slack-notifier.

use thiserror::Error;

/// Errors that can occur when posting to Slack.
#[derive(Debug, Error)]
pub enum SlackError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack answered with `ok: false`.
    #[error("Slack API error: {0}")]
    Api(String),

    /// Token or channel missing.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
