// handlers/public/status/ping_get.rs - GET /ping
use axum::Json;
use serde_json::{json, Value};

/// Process liveness only; never touches the database
pub async fn ping_get() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Service is running" }))
}
