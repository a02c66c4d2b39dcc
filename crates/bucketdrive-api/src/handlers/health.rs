//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let (status, database) = match &state.db_pool {
        None => (StatusCode::OK, "not_configured"),
        Some(pool) => match pool.health_check().await {
            Ok(true) => (StatusCode::OK, "connected"),
            _ => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        },
    };

    (
        status,
        Json(ApiResponse::ok(HealthResponse {
            status: if status.is_success() { "ok" } else { "degraded" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
        })),
    )
}
