//! Call log operations.

use database::validation::{require_text, validate_length};
use database::{alert, call_log, CallLog, Database, NewCallLog, PageInfo, ValidationError};
use tracing::debug;

use crate::error::{Result, ServiceError};
use crate::requests::{parse_id, CreateCallLogRequest, SearchCallLogsRequest, UpdateCallLogRequest};
use crate::responses::{CallLogSearchResponse, MessageResponse};

/// Call log operations over the primary store.
#[derive(Debug, Clone)]
pub struct CallLogService {
    db: Database,
}

impl CallLogService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record a call against an existing alert.
    pub async fn create(&self, req: CreateCallLogRequest) -> Result<CallLog> {
        let alert_id = req
            .alert_id
            .as_deref()
            .ok_or(ValidationError::Required("alertId"))
            .and_then(|id| parse_id("alertId", id))?;
        let called_by = require_text("calledBy", req.called_by.as_deref())?.to_string();
        let call_status = req
            .call_status
            .ok_or(ValidationError::Required("callStatus"))?;
        if let Some(call_id) = &req.call_id {
            validate_length("callId", call_id)?;
        }

        let new = NewCallLog {
            alert_id,
            called_by,
            call_status,
            call_id: req.call_id,
            summary: req.summary,
        };

        Ok(call_log::create_call_log(self.db.pool(), new).await?)
    }

    /// Overwrite the supplied fields of a call log.
    pub async fn update(&self, id: &str, req: UpdateCallLogRequest) -> Result<CallLog> {
        let id = parse_id("id", id)?;
        let changes = req.into_changes()?;

        Ok(call_log::update_call_log(self.db.pool(), &id, changes).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<MessageResponse> {
        let id = parse_id("id", id)?;
        call_log::delete_call_log(self.db.pool(), &id).await?;

        Ok(MessageResponse::new(format!(
            "Call log with ID {} deleted successfully",
            id
        )))
    }

    pub async fn get(&self, id: &str) -> Result<CallLog> {
        let id = parse_id("id", id)?;
        Ok(call_log::get_call_log(self.db.pool(), &id).await?)
    }

    /// Call logs of one alert, newest first.
    ///
    /// An alert without calls yields an empty list; only an unknown alert is
    /// an error.
    pub async fn list_for_alert(&self, alert_id: &str) -> Result<Vec<CallLog>> {
        let alert_id = parse_id("alertId", alert_id)?;
        if alert::find_alert(self.db.pool(), &alert_id).await?.is_none() {
            return Err(ServiceError::NotFound {
                entity: "Alert",
                id: alert_id,
            });
        }

        Ok(call_log::list_for_alert(self.db.pool(), &alert_id).await?)
    }

    /// Filtered, paginated search.
    pub async fn search(&self, req: SearchCallLogsRequest) -> Result<CallLogSearchResponse> {
        let (filter, pagination) = req.into_query()?;
        debug!(?filter, ?pagination, "Call log search");

        let (data, total) = call_log::search_call_logs(self.db.pool(), &filter, &pagination).await?;

        Ok(CallLogSearchResponse {
            data,
            pagination: PageInfo::new(pagination, total),
        })
    }
}
