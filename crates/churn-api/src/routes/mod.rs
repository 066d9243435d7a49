//! Route handlers for the churn alert API.

pub mod alerts;
pub mod call_logs;
pub mod communication;
pub mod health;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Alerts
        .route("/alerts", post(alerts::create))
        .route("/alerts/search", post(alerts::search))
        .route("/alerts/:id", get(alerts::get).delete(alerts::delete))
        .route("/alerts/:id/status", put(alerts::update_status))
        .route("/alerts/:id/assignment", put(alerts::update_assignment))
        // Call logs
        .route("/call-logs", post(call_logs::create))
        .route("/call-logs/search", post(call_logs::search))
        .route("/call-logs/alert/:alert_id", get(call_logs::by_alert))
        .route(
            "/call-logs/:id",
            get(call_logs::get)
                .put(call_logs::update)
                .delete(call_logs::delete),
        )
        // Notifications
        .route(
            "/communication/trigger-slack-alert",
            post(communication::trigger_slack_alert),
        )
}

/// Router with state and a permissive CORS policy.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router().layer(cors).with_state(state)
}
