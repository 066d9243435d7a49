//! Request bodies accepted by the services.
//!
//! Enum fields deserialize straight into their closed types, so an unknown
//! value is rejected while the body is parsed. Required fields are still
//! `Option`s here so that a missing field reports which one it was.

use chrono::{DateTime, NaiveDate, Utc};
use database::validation::{require_text, validate_id, validate_length};
use database::{
    timestamp, AlertComment, AlertFilter, AlertStatus, AlertType, CallLogChanges, CallLogFilter,
    CallStatus, DateRange, Pagination, Severity, ValidationError,
};
use serde::{Deserialize, Deserializer};

/// A comment attached to an assignment change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentInput {
    pub from_user: Option<String>,
    pub to_user: Option<String>,
    pub comment: Option<String>,
}

impl CommentInput {
    pub(crate) fn into_comment(self) -> Result<AlertComment, ValidationError> {
        let from_user = require_text("fromUser", self.from_user.as_deref())?.to_string();
        let comment = self
            .comment
            .filter(|c| !c.trim().is_empty())
            .ok_or(ValidationError::Required("comment"))?;
        let to_user = optional_text("toUser", self.to_user)?;

        Ok(AlertComment {
            from_user,
            to_user,
            comment,
        })
    }
}

/// Body of `POST /alerts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRequest {
    pub severity: Option<Severity>,
    pub merchant_id: Option<String>,
    pub alert_type: Option<AlertType>,
    pub assigned_to_user: Option<String>,
    pub summary: Option<serde_json::Value>,
    pub follow_up_reason: Option<String>,
    pub comment: Option<CommentInput>,
}

/// Call details supplied when resolving an alert.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallLogInput {
    pub called_by: Option<String>,
    pub call_id: Option<String>,
    pub call_status: Option<CallStatus>,
    pub summary: Option<String>,
    /// Next contact date, written to the alert.
    pub follow_up_date: Option<String>,
}

/// Body of `PUT /alerts/{id}/status`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: Option<AlertStatus>,
    pub follow_up_reason: Option<String>,
    pub call_log: Option<CallLogInput>,
}

/// Body of `PUT /alerts/{id}/assignment`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentRequest {
    pub assigned_to_user: Option<String>,
    pub comment: Option<CommentInput>,
}

/// Body of `POST /alerts/search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAlertsRequest {
    pub severity: Option<Severity>,
    pub alert_type: Option<AlertType>,
    pub assigned_to_user: Option<String>,
    pub status: Option<AlertStatus>,
    pub merchant_id: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl SearchAlertsRequest {
    /// Validate and split into the store filter and the page window.
    pub fn into_query(self) -> Result<(AlertFilter, Pagination), ValidationError> {
        let pagination = Pagination::new(self.page, self.limit)?;
        let filter = AlertFilter {
            severity: self.severity,
            alert_type: self.alert_type,
            assigned_to_user: optional_text("assignedToUser", self.assigned_to_user)?,
            status: self.status,
            merchant_id: optional_text("merchantId", self.merchant_id)?,
            created: date_range(self.from_date, self.to_date)?,
        };
        Ok((filter, pagination))
    }
}

/// Body of `POST /call-logs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCallLogRequest {
    pub alert_id: Option<String>,
    pub called_by: Option<String>,
    pub call_status: Option<CallStatus>,
    pub call_id: Option<String>,
    pub summary: Option<String>,
}

/// Body of `PUT /call-logs/{id}`.
///
/// An absent field is left alone. `callId` and `summary` may be sent as
/// `null` to clear them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCallLogRequest {
    pub called_by: Option<String>,
    pub call_status: Option<CallStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub call_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub summary: Option<Option<String>>,
}

impl UpdateCallLogRequest {
    pub(crate) fn into_changes(self) -> Result<CallLogChanges, ValidationError> {
        let called_by = match self.called_by {
            Some(value) => Some(require_text("calledBy", Some(&value))?.to_string()),
            None => None,
        };
        if let Some(Some(call_id)) = &self.call_id {
            validate_length("callId", call_id)?;
        }

        Ok(CallLogChanges {
            called_by,
            call_status: self.call_status,
            call_id: self.call_id,
            summary: self.summary,
        })
    }
}

/// Body of `POST /call-logs/search`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCallLogsRequest {
    pub called_by: Option<String>,
    pub call_status: Option<CallStatus>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl SearchCallLogsRequest {
    /// Validate and split into the store filter and the page window.
    pub fn into_query(self) -> Result<(CallLogFilter, Pagination), ValidationError> {
        let pagination = Pagination::new(self.page, self.limit)?;
        let filter = CallLogFilter {
            called_by: optional_text("calledBy", self.called_by)?,
            call_status: self.call_status,
            created: date_range(self.from_date, self.to_date)?,
        };
        Ok((filter, pagination))
    }
}

/// A present field, `null` included, becomes `Some`; only an absent one is `None`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parse an identifier, rejecting anything that is not a UUID.
pub fn parse_id(field: &'static str, value: &str) -> Result<String, ValidationError> {
    validate_id(field, value)?;
    Ok(value.trim().to_string())
}

pub(crate) fn parse_date(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<NaiveDate>, ValidationError> {
    Ok(parse_timestamp(field, value)?.map(|ts| ts.date_naive()))
}

fn parse_timestamp(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    match value {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => timestamp::parse(&raw)
            .map(Some)
            .ok_or(ValidationError::InvalidDate { field, value: raw }),
    }
}

fn date_range(from: Option<String>, to: Option<String>) -> Result<DateRange, ValidationError> {
    Ok(DateRange::new(
        parse_timestamp("fromDate", from)?,
        parse_timestamp("toDate", to)?,
    ))
}

/// Blank strings count as absent.
fn optional_text(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, ValidationError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => {
            validate_length(field, text)?;
            Ok(Some(text.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_enum_value_rejected_at_parse() {
        let body = r#"{"severity": "Severe", "merchantId": "M1", "alertType": "GTV Drop"}"#;
        assert!(serde_json::from_str::<CreateAlertRequest>(body).is_err());

        let body = r#"{"severity": "Critical", "merchantId": "M1", "alertType": "GTV Drop"}"#;
        let req: CreateAlertRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.severity, Some(Severity::Critical));
        assert_eq!(req.alert_type, Some(AlertType::GtvDrop));
    }

    #[test]
    fn test_search_query_swaps_reversed_dates() {
        let req = SearchAlertsRequest {
            from_date: Some("2025-07-10".to_string()),
            to_date: Some("2025-07-01".to_string()),
            ..Default::default()
        };
        let (filter, pagination) = req.into_query().unwrap();

        assert!(filter.created.from() < filter.created.to());
        assert_eq!(filter.created.from(), timestamp::parse("2025-07-01"));
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.limit(), 10);
    }

    #[test]
    fn test_search_query_rejects_bad_input() {
        let req = SearchAlertsRequest {
            limit: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            req.into_query(),
            Err(ValidationError::TooSmall { field: "limit", .. })
        ));

        let req = SearchCallLogsRequest {
            from_date: Some("last week".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            req.into_query(),
            Err(ValidationError::InvalidDate { field: "fromDate", .. })
        ));
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let req = SearchCallLogsRequest {
            called_by: Some("  ".to_string()),
            ..Default::default()
        };
        let (filter, _) = req.into_query().unwrap();
        assert_eq!(filter.called_by, None);
    }

    #[test]
    fn test_comment_requires_author_and_text() {
        let input = CommentInput {
            from_user: None,
            to_user: None,
            comment: Some("over to you".to_string()),
        };
        assert_eq!(
            input.into_comment(),
            Err(ValidationError::Required("fromUser"))
        );

        let input = CommentInput {
            from_user: Some("ana".to_string()),
            to_user: Some("".to_string()),
            comment: Some("over to you".to_string()),
        };
        let comment = input.into_comment().unwrap();
        assert_eq!(comment.from_user, "ana");
        assert_eq!(comment.to_user, None);
    }

    #[test]
    fn test_call_log_update_distinguishes_null_from_absent() {
        let req: UpdateCallLogRequest =
            serde_json::from_str(r#"{"callId": null, "callStatus": "Bounced"}"#).unwrap();
        assert_eq!(req.call_id, Some(None));
        assert_eq!(req.summary, None);

        let changes = req.into_changes().unwrap();
        assert_eq!(changes.call_id, Some(None));
        assert_eq!(changes.summary, None);
        assert_eq!(changes.call_status, Some(CallStatus::Bounced));

        let req: UpdateCallLogRequest =
            serde_json::from_str(r#"{"summary": "left voicemail"}"#).unwrap();
        assert_eq!(req.summary, Some(Some("left voicemail".to_string())));
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id("id", "123").is_err());
        assert_eq!(
            parse_id("id", "550e8400-e29b-41d4-a716-446655440001").unwrap(),
            "550e8400-e29b-41d4-a716-446655440001"
        );
    }
}
