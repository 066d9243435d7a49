//! Notification routes.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use slack_notifier::SlackMessage;

use crate::error::{ApiError, Result};
use crate::extract::ApiJson;
use crate::state::AppState;

/// Outcome of a Slack trigger.
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Forward a message to Slack. Delivery failures are reported in the body,
/// not as an error status.
pub async fn trigger_slack_alert(
    State(state): State<AppState>,
    ApiJson(message): ApiJson<SlackMessage>,
) -> Result<Json<TriggerResponse>> {
    if let Some(field) = message.blank_field() {
        return Err(ApiError::BadRequest(format!("{} cannot be empty", field)));
    }

    let success = state.notifier.trigger(&message).await;

    Ok(Json(TriggerResponse {
        success,
        message: if success {
            "Slack alert triggered successfully."
        } else {
            "Failed to trigger Slack alert."
        },
    }))
}
