use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(handlers::health::health_check))
        .route("/health/tools", get(handlers::health::tool_health))
        // Thumbnails
        .route("/generate-thumbnail", post(handlers::thumbnail::generate_thumbnail))
}
