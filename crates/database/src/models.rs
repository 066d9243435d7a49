//! Database models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::validation::ValidationError;

/// Declares a closed set of string values shared by JSON and the TEXT columns.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                #[sqlx(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stored and serialized form.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ValidationError::InvalidValue {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

text_enum! {
    /// Urgency of an alert.
    pub enum Severity as "severity" {
        Low => "Low",
        Medium => "Medium",
        High => "High",
        Critical => "Critical",
    }
}

text_enum! {
    /// The merchant metric whose drop raised the alert.
    pub enum AlertType as "alertType" {
        /// Gross transaction value dropped.
        GtvDrop => "GTV Drop",
        /// Transaction count dropped.
        TcDrop => "TC Drop",
    }
}

text_enum! {
    /// Review state of an alert.
    pub enum AlertStatus as "status" {
        Open => "Open",
        Resolved => "Resolved",
    }
}

text_enum! {
    /// Outcome of a follow-up call.
    pub enum CallStatus as "callStatus" {
        ReEngaged => "Re-Engaged",
        NotInterested => "Not Interested",
        Bounced => "Bounced",
        CallbackScheduled => "Callback Scheduled",
        NoAnswer => "No Answer",
    }
}

text_enum! {
    /// Metric a severity threshold applies to.
    pub enum ThresholdType as "thresholdType" {
        Gtv => "GTV",
        Tc => "TC",
    }
}

/// A note left on an alert when it changes hands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertComment {
    /// User who wrote the comment.
    pub from_user: String,
    /// User the comment is addressed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_user: Option<String>,
    /// Comment text.
    pub comment: String,
}

/// A detected merchant business-health drop awaiting review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// UUID, generated at creation.
    pub id: String,
    pub severity: Severity,
    /// Merchant the alert is about. Not checked against the merchant directory.
    pub merchant_id: String,
    pub alert_type: AlertType,
    /// Current owner, if assigned.
    pub assigned_to_user: Option<String>,
    /// Opaque metric payload supplied by the detector.
    pub summary: Option<Json<serde_json::Value>>,
    pub status: AlertStatus,
    pub follow_up_date: Option<NaiveDate>,
    pub follow_up_reason: Option<String>,
    /// Append-only assignment notes, oldest first.
    pub comments: Json<Vec<AlertComment>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when recording a new alert.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub severity: Severity,
    pub merchant_id: String,
    pub alert_type: AlertType,
    pub assigned_to_user: Option<String>,
    pub summary: Option<serde_json::Value>,
    pub follow_up_reason: Option<String>,
    pub comment: Option<AlertComment>,
}

/// A status transition, optionally carrying follow-up details.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: AlertStatus,
    pub follow_up_reason: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
}

/// A follow-up call made about an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CallLog {
    /// UUID, generated at creation.
    pub id: String,
    /// Owning alert.
    pub alert_id: String,
    /// Reference in the external call system.
    pub call_id: Option<String>,
    /// Who made the call.
    pub called_by: String,
    pub call_status: CallStatus,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when recording a call.
#[derive(Debug, Clone)]
pub struct NewCallLog {
    pub alert_id: String,
    pub called_by: String,
    pub call_status: CallStatus,
    pub call_id: Option<String>,
    pub summary: Option<String>,
}

/// Partial update of a call log; `None` leaves a field unchanged.
///
/// The nullable fields take `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default)]
pub struct CallLogChanges {
    pub called_by: Option<String>,
    pub call_status: Option<CallStatus>,
    pub call_id: Option<Option<String>>,
    pub summary: Option<Option<String>>,
}

/// Threshold that maps a metric drop to a severity for one business type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BusinessCategorySeverity {
    pub id: String,
    pub business_type_id: String,
    pub threshold_type: ThresholdType,
    #[serde(rename = "severityType")]
    pub severity: Severity,
    /// Drop percentage at or above which `severity` applies.
    pub threshold_value: i64,
}

/// Monthly transaction aggregate for one merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub id: String,
    pub business_id: Option<String>,
    pub user_id: Option<String>,
    pub store_id: Option<String>,
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    /// Per-day breakdown keyed by ISO date.
    pub meta_data: Option<Json<serde_json::Value>>,
    pub transaction_count: Option<i64>,
    pub transaction_volume: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written by the snapshot builder.
#[derive(Debug, Clone)]
pub struct NewUserSnapshot {
    pub business_id: Option<String>,
    pub user_id: Option<String>,
    pub store_id: Option<String>,
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub meta_data: Option<serde_json::Value>,
    pub transaction_count: Option<i64>,
    pub transaction_volume: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_text_round_trip() {
        for status in CallStatus::ALL {
            assert_eq!(status.as_str().parse::<CallStatus>().unwrap(), *status);
        }
        assert_eq!("GTV Drop".parse::<AlertType>().unwrap(), AlertType::GtvDrop);
    }

    #[test]
    fn test_enum_rejects_unknown_value() {
        assert_eq!(
            "Urgent".parse::<Severity>(),
            Err(ValidationError::InvalidValue {
                field: "severity",
                value: "Urgent".to_string(),
            })
        );
        assert!(serde_json::from_str::<Severity>("\"critical\"").is_err());
    }

    #[test]
    fn test_enum_json_form() {
        assert_eq!(
            serde_json::to_string(&CallStatus::CallbackScheduled).unwrap(),
            "\"Callback Scheduled\""
        );
        assert_eq!(
            serde_json::from_str::<AlertType>("\"TC Drop\"").unwrap(),
            AlertType::TcDrop
        );
    }

    #[test]
    fn test_comment_json_shape() {
        let comment: AlertComment =
            serde_json::from_str(r#"{"fromUser":"ana","comment":"call them"}"#).unwrap();
        assert_eq!(comment.to_user, None);
        assert_eq!(
            serde_json::to_value(&comment).unwrap(),
            serde_json::json!({"fromUser": "ana", "comment": "call them"})
        );
    }
}
