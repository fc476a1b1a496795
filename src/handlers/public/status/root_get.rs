// handlers/public/status/root_get.rs - GET /
use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// Clio connection status with a link to (re)authorize
pub async fn root_get(State(state): State<AppState>) -> Json<Value> {
    let clio = state.clio();
    let auth_url = clio.oauth().authorize_url().ok();

    if clio.has_access_token().await {
        Json(json!({
            "status": "connected",
            "message": "GHL to Clio bridge is active and authenticated with Clio",
            "reauth_url": auth_url,
            "version": env!("CARGO_PKG_VERSION")
        }))
    } else {
        Json(json!({
            "status": "not_connected",
            "message": "Not authenticated with Clio",
            "auth_url": auth_url,
            "version": env!("CARGO_PKG_VERSION")
        }))
    }
}
