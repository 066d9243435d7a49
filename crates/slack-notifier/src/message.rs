//! Alert levels and message formatting.

use serde::{Deserialize, Serialize};

/// Urgency of a Slack alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    HighLevelAlert,
    MidLevelAlert,
    LowLevelAlert,
}

impl AlertLevel {
    /// Emoji shown in front of the message header.
    pub fn marker(&self) -> &'static str {
        match self {
            AlertLevel::HighLevelAlert => ":red_circle:",
            AlertLevel::MidLevelAlert => ":large_orange_circle:",
            AlertLevel::LowLevelAlert => ":large_yellow_circle:",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AlertLevel::HighLevelAlert => "High level alert",
            AlertLevel::MidLevelAlert => "Mid level alert",
            AlertLevel::LowLevelAlert => "Low level alert",
        }
    }
}

/// A notification to forward, either structured or pre-formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlackMessage {
    #[serde(rename_all = "camelCase")]
    Alert {
        alert_level: AlertLevel,
        business_name: String,
        reason: String,
        summary: String,
    },
    Plain { message: String },
}

impl SlackMessage {
    /// Name of the first blank field, if any.
    pub fn blank_field(&self) -> Option<&'static str> {
        let fields = match self {
            SlackMessage::Alert {
                business_name,
                reason,
                summary,
                ..
            } => vec![
                ("businessName", business_name.as_str()),
                ("reason", reason.as_str()),
                ("summary", summary.as_str()),
            ],
            SlackMessage::Plain { message } => vec![("message", message.as_str())],
        };
        fields
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
    }

    /// Render the Slack `text` payload.
    pub fn render(&self) -> String {
        match self {
            SlackMessage::Alert {
                alert_level,
                business_name,
                reason,
                summary,
            } => format!(
                "{} *{}*\n*Business:* {}\n*Reason:* {}\n*Summary:* {}",
                alert_level.marker(),
                alert_level.title(),
                business_name.trim(),
                reason.trim(),
                summary.trim()
            ),
            SlackMessage::Plain { message } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_body_and_render() {
        let msg: SlackMessage = serde_json::from_str(
            r#"{"alertLevel": "high_level_alert", "businessName": "Corner Cafe", "reason": "GTV down 45%", "summary": "No sales in 5 days"}"#,
        )
        .unwrap();
        assert_eq!(
            msg.render(),
            ":red_circle: *High level alert*\n*Business:* Corner Cafe\n*Reason:* GTV down 45%\n*Summary:* No sales in 5 days"
        );
        assert_eq!(msg.blank_field(), None);
    }

    #[test]
    fn test_plain_body() {
        let msg: SlackMessage = serde_json::from_str(r#"{"message": "hello"}"#).unwrap();
        assert_eq!(msg, SlackMessage::Plain { message: "hello".into() });
        assert_eq!(msg.render(), "hello");

        let blank: SlackMessage = serde_json::from_str(r#"{"message": "  "}"#).unwrap();
        assert_eq!(blank.blank_field(), Some("message"));
    }

    #[test]
    fn test_unknown_level_rejected() {
        let result = serde_json::from_str::<SlackMessage>(
            r#"{"alertLevel": "urgent", "businessName": "x", "reason": "y", "summary": "z"}"#,
        );
        assert!(result.is_err());
    }
}
