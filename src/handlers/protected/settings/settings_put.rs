// handlers/protected/settings/settings_put.rs - PUT /api/settings/:service
use axum::extract::{Extension, Path, State};
use tracing::info;

use crate::database::models::{ApiConfigStatus, ApiConfigUpdate};
use crate::error::ApiError;
use crate::middleware::{AdminUser, ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;
use crate::types::Platform;

/// Takes effect on the next outbound request; clients re-read credentials each call
pub async fn settings_put(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(service): Path<String>,
    JsonBody(update): JsonBody<ApiConfigUpdate>,
) -> ApiResult<ApiConfigStatus> {
    let platform = Platform::parse_service(&service)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown service: {}", service)))?;

    let record = state.store.upsert_api_config(platform, update).await?;
    info!("{} updated {} API settings", admin.subject, platform.display_name());

    Ok(ApiResponse::success(record.status()))
}
