//! Call log routes.

use alert_service::{
    CallLogSearchResponse, CreateCallLogRequest, MessageResponse, SearchCallLogsRequest,
    UpdateCallLogRequest,
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::CallLog;

use crate::error::Result;
use crate::extract::ApiJson;
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateCallLogRequest>,
) -> Result<(StatusCode, Json<CallLog>)> {
    let call_log = state.call_logs.create(req).await?;
    Ok((StatusCode::CREATED, Json(call_log)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateCallLogRequest>,
) -> Result<Json<CallLog>> {
    Ok(Json(state.call_logs.update(&id, req).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    Ok(Json(state.call_logs.delete(&id).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<CallLog>> {
    Ok(Json(state.call_logs.get(&id).await?))
}

pub async fn by_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
) -> Result<Json<Vec<CallLog>>> {
    Ok(Json(state.call_logs.list_for_alert(&alert_id).await?))
}

pub async fn search(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SearchCallLogsRequest>,
) -> Result<Json<CallLogSearchResponse>> {
    Ok(Json(state.call_logs.search(req).await?))
}
