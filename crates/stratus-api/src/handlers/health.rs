//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

/// GET /api/health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/health/detailed — checks database and storage reachability.
pub async fn detailed_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = state.db.health_check().await.unwrap_or(false);
    let storage = state.storage.health_check().await.unwrap_or(false);

    Json(serde_json::json!({
        "status": if database && storage { "ok" } else { "degraded" },
        "database": database,
        "storage": storage,
    }))
}
