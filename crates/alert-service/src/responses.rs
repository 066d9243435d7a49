//! Response envelopes returned by the services.

use database::{Alert, CallLog, PageInfo, SeverityStats};
use serde::Serialize;

/// One page of alerts with pagination metadata and the severity histogram.
#[derive(Debug, Clone, Serialize)]
pub struct AlertSearchResponse {
    pub data: Vec<Alert>,
    pub pagination: PageInfo,
    pub stats: SeverityStats,
}

/// One page of call logs with pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct CallLogSearchResponse {
    pub data: Vec<CallLog>,
    pub pagination: PageInfo,
}

/// Result of a status change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResponse {
    pub alert: Alert,
    /// Present when the change recorded a call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_log: Option<CallLog>,
}

/// An alert together with its call logs, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDetail {
    pub alert: Alert,
    pub call_logs: Vec<CallLog>,
}

/// Plain confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
