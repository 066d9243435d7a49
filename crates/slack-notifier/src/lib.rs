//! Slack notifications for churn alerts.
//!
//! [`SlackClient`] talks to the Slack Web API. [`Notifier`] wraps it for
//! callers that only need to know whether the message went out.
//!
//! # Example
//!
//! ```no_run
//! use slack_notifier::{AlertLevel, Notifier, SlackConfig, SlackMessage};
//!
//! # async fn example() -> Result<(), slack_notifier::SlackError> {
//! let config = SlackConfig::new(Some("xoxb-token".into()), Some("C0123".into()));
//! let notifier = Notifier::new(config)?;
//!
//! let sent = notifier
//!     .trigger(&SlackMessage::Alert {
//!         alert_level: AlertLevel::HighLevelAlert,
//!         business_name: "Corner Cafe".into(),
//!         reason: "GTV down 45%".into(),
//!         summary: "No sales in 5 days".into(),
//!     })
//!     .await;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod message;

pub use client::SlackClient;
pub use config::{SlackConfig, DEFAULT_API_BASE};
pub use error::SlackError;
pub use message::{AlertLevel, SlackMessage};

use tracing::{error, info};

/// Forwards messages to Slack, reporting only success or failure.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: SlackClient,
}

impl Notifier {
    pub fn new(config: SlackConfig) -> Result<Self, SlackError> {
        let client = SlackClient::new(config)?;
        if !client.config().is_configured() {
            info!("Slack credentials not set; notifications will be skipped");
        }
        Ok(Self { client })
    }

    /// Send a message. Failures are logged and reported as `false`.
    pub async fn trigger(&self, message: &SlackMessage) -> bool {
        match self.client.post_message(&message.render()).await {
            Ok(()) => true,
            Err(SlackError::Config(msg)) => {
                error!("Slack configuration missing: {}", msg);
                false
            }
            Err(e) => {
                error!(error = %e, "Failed to post Slack message");
                false
            }
        }
    }
}
