//! Alert routes.

use alert_service::{
    AlertDetail, AlertSearchResponse, CreateAlertRequest, MessageResponse, SearchAlertsRequest,
    StatusUpdateResponse, UpdateAssignmentRequest, UpdateStatusRequest,
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::Alert;
use merchant_data::Merchant;
use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::state::AppState;

/// An alert with its call logs and, when the directory knows it, the merchant.
#[derive(Serialize)]
pub struct AlertDetailResponse {
    #[serde(flatten)]
    pub detail: AlertDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<Merchant>,
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateAlertRequest>,
) -> Result<(StatusCode, Json<Alert>)> {
    let alert = state.alerts.create(req).await?;
    Ok((StatusCode::CREATED, Json(alert)))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<Json<StatusUpdateResponse>> {
    Ok(Json(state.alerts.update_status(&id, req).await?))
}

pub async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateAssignmentRequest>,
) -> Result<Json<Alert>> {
    Ok(Json(state.alerts.update_assignment(&id, req).await?))
}

pub async fn search(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SearchAlertsRequest>,
) -> Result<Json<AlertSearchResponse>> {
    Ok(Json(state.alerts.search(req).await?))
}

/// Fetch an alert. Merchant lookup failures are logged and leave out the
/// `merchant` field.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AlertDetailResponse>> {
    let detail = state.alerts.get(&id).await?;

    let merchant = match &state.directory {
        Some(directory) => {
            let merchant_id = &detail.alert.merchant_id;
            match merchant_data::merchant_profile(
                directory.as_ref(),
                state.ledger.as_deref(),
                merchant_id,
            )
            .await
            {
                Ok(found) => found,
                Err(e) => {
                    warn!(merchant_id = %merchant_id, error = %e, "Merchant lookup failed");
                    None
                }
            }
        }
        None => None,
    };

    Ok(Json(AlertDetailResponse { detail, merchant }))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    Ok(Json(state.alerts.delete(&id).await?))
}
