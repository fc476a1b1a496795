// handlers/protected/sync/test_connection_post.rs - POST /api/test-connection
use axum::extract::State;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::services::SyncOutcome;
use crate::state::AppState;
use crate::types::Platform;

#[derive(Debug, Deserialize)]
pub struct TestConnectionRequest {
    #[serde(default)]
    pub service: String,
}

/// The check itself is the payload: a failed connection is still a 200 with `success: false`
pub async fn test_connection_post(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<TestConnectionRequest>,
) -> ApiResult<SyncOutcome> {
    let service =
        Platform::parse_service(&req.service).ok_or_else(|| ApiError::bad_request("Invalid service specified"))?;
    Ok(ApiResponse::success(state.integration.test_connection(service).await))
}
