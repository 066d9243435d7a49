//! Configuration types for slack-notifier.

/// Default Slack Web API base URL.
pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// Credentials and destination for Slack notifications.
#[derive(Debug, Clone)]
pub struct SlackConfig {
    /// Bot token sent as a bearer token.
    pub token: Option<String>,
    /// Channel the messages are posted to.
    pub channel_id: Option<String>,
    /// Base URL of the Web API (overridable for tests).
    pub api_base: String,
}

impl SlackConfig {
    /// Create a configuration against the public Slack API.
    pub fn new(token: Option<String>, channel_id: Option<String>) -> Self {
        Self {
            token,
            channel_id,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Override the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Whether both the token and the channel are set.
    pub fn is_configured(&self) -> bool {
        non_blank(&self.token).is_some() && non_blank(&self.channel_id).is_some()
    }

    /// Get the `chat.postMessage` endpoint URL.
    pub fn post_message_url(&self) -> String {
        format!("{}/chat.postMessage", self.api_base.trim_end_matches('/'))
    }

    pub(crate) fn credentials(&self) -> Option<(&str, &str)> {
        Some((non_blank(&self.token)?, non_blank(&self.channel_id)?))
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self::new(None, None)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
