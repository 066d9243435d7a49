//! Alert lifecycle and call log services.
//!
//! These sit between the HTTP surface and the `database` crate: they
//! validate request bodies, enforce the resolve-needs-a-call rule and shape
//! the response envelopes.

mod alerts;
mod call_logs;
mod error;
pub mod requests;
pub mod responses;

pub use alerts::AlertService;
pub use call_logs::CallLogService;
pub use error::{Result, ServiceError};
pub use requests::{
    CallLogInput, CommentInput, CreateAlertRequest, CreateCallLogRequest, SearchAlertsRequest,
    SearchCallLogsRequest, UpdateAssignmentRequest, UpdateCallLogRequest, UpdateStatusRequest,
};
pub use responses::{
    AlertDetail, AlertSearchResponse, CallLogSearchResponse, MessageResponse, StatusUpdateResponse,
};

#[cfg(test)]
pub(crate) mod test_support {
    use database::Database;

    pub async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }
}
