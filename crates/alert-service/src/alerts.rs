//! Alert lifecycle: create, status transitions, assignment, search, lookup
//! and deletion.

use database::validation::{require_text, validate_length};
use database::{
    alert, call_log, Alert, AlertStatus, Database, NewAlert, NewCallLog, PageInfo, StatusChange,
    ValidationError,
};
use tracing::{debug, info};

use crate::error::{Result, ServiceError};
use crate::requests::{
    parse_date, parse_id, CallLogInput, CreateAlertRequest, SearchAlertsRequest,
    UpdateAssignmentRequest, UpdateStatusRequest,
};
use crate::responses::{AlertDetail, AlertSearchResponse, MessageResponse, StatusUpdateResponse};

/// Alert operations over the primary store.
#[derive(Debug, Clone)]
pub struct AlertService {
    db: Database,
}

impl AlertService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record a new alert. The status always starts as Open.
    pub async fn create(&self, req: CreateAlertRequest) -> Result<Alert> {
        let severity = req.severity.ok_or(ValidationError::Required("severity"))?;
        let alert_type = req.alert_type.ok_or(ValidationError::Required("alertType"))?;
        let merchant_id = require_text("merchantId", req.merchant_id.as_deref())?.to_string();
        if let Some(user) = &req.assigned_to_user {
            validate_length("assignedToUser", user)?;
        }
        let comment = req.comment.map(|c| c.into_comment()).transpose()?;

        let new = NewAlert {
            severity,
            merchant_id,
            alert_type,
            assigned_to_user: req.assigned_to_user,
            summary: req.summary,
            follow_up_reason: req.follow_up_reason,
            comment,
        };

        Ok(alert::create_alert(self.db.pool(), new).await?)
    }

    /// Change an alert's status.
    ///
    /// Resolving requires call details, which are stored as a new call log in
    /// the same transaction as the status change. Reopening needs none and
    /// ignores any that are sent.
    pub async fn update_status(
        &self,
        id: &str,
        req: UpdateStatusRequest,
    ) -> Result<StatusUpdateResponse> {
        let id = parse_id("id", id)?;
        if alert::find_alert(self.db.pool(), &id).await?.is_none() {
            return Err(ServiceError::NotFound {
                entity: "Alert",
                id,
            });
        }
        let status = req.status.ok_or(ValidationError::Required("status"))?;

        let mut change = StatusChange {
            status,
            follow_up_reason: req.follow_up_reason,
            follow_up_date: None,
        };

        let call = match status {
            AlertStatus::Resolved => {
                let input = req.call_log.ok_or(ValidationError::Required("callLog"))?;
                let (call, follow_up_date) = resolution_call(&id, input)?;
                change.follow_up_date = follow_up_date;
                Some(call)
            }
            AlertStatus::Open => None,
        };

        let (alert, call_log) = alert::change_status(self.db.pool(), &id, change, call).await?;

        Ok(StatusUpdateResponse { alert, call_log })
    }

    /// Reassign an alert and/or append a comment to its history.
    pub async fn update_assignment(&self, id: &str, req: UpdateAssignmentRequest) -> Result<Alert> {
        let id = parse_id("id", id)?;
        let assigned_to_user = match req.assigned_to_user {
            Some(user) => Some(require_text("assignedToUser", Some(&user))?.to_string()),
            None => None,
        };
        let comment = req.comment.map(|c| c.into_comment()).transpose()?;

        Ok(alert::update_assignment(self.db.pool(), &id, assigned_to_user, comment).await?)
    }

    /// Filtered, paginated search with the per-severity histogram.
    pub async fn search(&self, req: SearchAlertsRequest) -> Result<AlertSearchResponse> {
        let (filter, pagination) = req.into_query()?;
        debug!(?filter, ?pagination, "Alert search");

        let found = alert::search_alerts(self.db.pool(), &filter, &pagination).await?;

        Ok(AlertSearchResponse {
            data: found.alerts,
            pagination: PageInfo::new(pagination, found.total),
            stats: found.stats,
        })
    }

    /// An alert with all of its call logs.
    pub async fn get(&self, id: &str) -> Result<AlertDetail> {
        let id = parse_id("id", id)?;
        let alert = alert::get_alert(self.db.pool(), &id).await?;
        let call_logs = call_log::list_for_alert(self.db.pool(), &id).await?;

        Ok(AlertDetail { alert, call_logs })
    }

    /// Delete an alert and its call logs.
    pub async fn delete(&self, id: &str) -> Result<MessageResponse> {
        let id = parse_id("id", id)?;
        let removed = alert::delete_alert(self.db.pool(), &id).await?;
        info!(alert_id = %id, call_logs = removed, "Alert removed with its call logs");

        Ok(MessageResponse::new(format!(
            "Alert with ID {} deleted successfully",
            id
        )))
    }
}

/// Validate the call that accompanies a resolution.
fn resolution_call(
    alert_id: &str,
    input: CallLogInput,
) -> std::result::Result<(NewCallLog, Option<chrono::NaiveDate>), ValidationError> {
    let called_by = require_text("callLog.calledBy", input.called_by.as_deref())?.to_string();
    let call_status = input
        .call_status
        .ok_or(ValidationError::Required("callLog.callStatus"))?;
    if let Some(call_id) = &input.call_id {
        validate_length("callLog.callId", call_id)?;
    }
    let follow_up_date = parse_date("callLog.followUpDate", input.follow_up_date)?;

    Ok((
        NewCallLog {
            alert_id: alert_id.to_string(),
            called_by,
            call_status,
            call_id: input.call_id,
            summary: input.summary,
        },
        follow_up_date,
    ))
}
