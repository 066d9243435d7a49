//! Slack Web API client.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SlackConfig;
use crate::error::SlackError;

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

/// The part of a Slack API response that says whether the call worked.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    error: Option<String>,
}

/// Client for posting messages to a Slack channel.
#[derive(Debug, Clone)]
pub struct SlackClient {
    http: Client,
    config: SlackConfig,
}

impl SlackClient {
    /// Build a client. Missing credentials are only reported when posting.
    pub fn new(config: SlackConfig) -> Result<Self, SlackError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(SlackError::Http)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &SlackConfig {
        &self.config
    }

    /// Post `text` to the configured channel.
    pub async fn post_message(&self, text: &str) -> Result<(), SlackError> {
        let (token, channel) = self
            .config
            .credentials()
            .ok_or_else(|| SlackError::Config("SLACK_APP_TOKEN and SLACK_CHANNEL_ID are required".into()))?;

        let url = self.config.post_message_url();
        debug!("Posting Slack message: {}", url);

        let resp: ApiResponse = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&PostMessageRequest { channel, text })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !resp.ok {
            return Err(SlackError::Api(
                resp.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }

        info!(channel = %channel, "Successfully notified Slack channel");
        Ok(())
    }
}
