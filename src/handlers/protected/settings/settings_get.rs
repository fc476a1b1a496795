// handlers/protected/settings/settings_get.rs - GET /api/settings
use axum::extract::State;
use serde::Serialize;

use super::service_status;
use crate::database::models::ApiConfigStatus;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::Platform;

/// Secrets are never echoed back, only whether they are set
#[derive(Debug, Serialize)]
pub struct Settings {
    pub ghl: ApiConfigStatus,
    pub clio: ApiConfigStatus,
    pub clio_auth_url: Option<String>,
}

pub async fn settings_get(State(state): State<AppState>) -> ApiResult<Settings> {
    Ok(ApiResponse::success(Settings {
        ghl: service_status(&state, Platform::Ghl).await?,
        clio: service_status(&state, Platform::Clio).await?,
        clio_auth_url: state.clio().oauth().authorize_url().ok(),
    }))
}
