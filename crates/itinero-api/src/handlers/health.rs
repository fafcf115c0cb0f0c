//! Liveness and readiness endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health — liveness.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /health/ready — readiness, checks the database.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match itinero_database::connection::health_check(&state.db_pool).await {
        Ok(true) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Ok(false) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable", "message": e.to_string() })),
        ),
    }
}
