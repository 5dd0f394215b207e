use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};
use tracing::debug;

use rawpeek_core::api_types::HealthResponse;

use crate::state::AppState;

/// GET /health: liveness only; does not touch the external tools.
pub async fn health_check() -> impl IntoResponse {
    debug!("Health check requested");

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
    )
}

/// GET /health/tools: the capability report taken at startup.
/// 503 when any tool was missing so monitors can alert on it.
pub async fn tool_health(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.capabilities.as_ref().clone();
    let status = if report.all_available() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}
