//! Error types for the HTTP API.

use alert_service::ServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or incomplete request.
    #[error("{0}")]
    BadRequest(String),

    /// Unknown record.
    #[error("{0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => ApiError::BadRequest(e.to_string()),
            e @ ServiceError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            ServiceError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => {
                tracing::debug!(status = status.as_u16(), "Request rejected: {}", other);
                other.to_string()
            }
        };

        let body = serde_json::json!({
            "error": message,
            "statusCode": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for route handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
