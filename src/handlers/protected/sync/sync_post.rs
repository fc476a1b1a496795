// handlers/protected/sync/sync_post.rs - POST /api/sync-data
use axum::extract::State;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::services::{SyncDirection, SyncOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub direction: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
}

/// One contact when `entity_id` is given, otherwise the whole contact list
pub async fn sync_post(State(state): State<AppState>, JsonBody(req): JsonBody<SyncRequest>) -> ApiResult<SyncOutcome> {
    let direction = match req.direction.as_deref().filter(|d| !d.is_empty()) {
        None => SyncDirection::default(),
        Some(d) => SyncDirection::parse(d).ok_or_else(|| ApiError::bad_request(format!("Invalid sync direction: {}", d)))?,
    };
    let entity_type = req.entity_type.as_deref().filter(|t| !t.is_empty()).unwrap_or("contact");
    let entity_id = req.entity_id.as_deref().filter(|id| !id.is_empty());

    let outcome = state.integration.sync(direction, entity_type, entity_id).await;
    if outcome.success {
        return Ok(ApiResponse::success(outcome));
    }

    let message = outcome.error.unwrap_or_else(|| "Sync failed".to_string());
    if entity_type != "contact" {
        Err(ApiError::bad_request(message))
    } else {
        Err(ApiError::bad_gateway(message))
    }
}
