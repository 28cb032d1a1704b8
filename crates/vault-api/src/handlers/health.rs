//! Liveness probe.

use axum::{response::IntoResponse, Json};

/// Always 200 while the process is serving; does not touch storage.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
