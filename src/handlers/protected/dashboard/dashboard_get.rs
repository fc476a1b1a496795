// handlers/protected/dashboard/dashboard_get.rs - GET /api/dashboard
use axum::extract::State;
use serde::Serialize;

use crate::database::models::{ApiConfigStatus, ErrorLog, TransactionStats};
use crate::handlers::protected::settings::service_status;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::Platform;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub stats: TransactionStats,
    pub success_rate: f64,
    pub recent_errors: Vec<ErrorLog>,
    pub ghl: ApiConfigStatus,
    pub clio: ApiConfigStatus,
}

pub async fn dashboard_get(State(state): State<AppState>) -> ApiResult<Dashboard> {
    let stats = state.store.transaction_stats().await?;
    let recent_errors = state.store.recent_errors(None, 5).await?;

    Ok(ApiResponse::success(Dashboard {
        success_rate: (stats.success_rate() * 10.0).round() / 10.0,
        stats,
        recent_errors,
        ghl: service_status(&state, Platform::Ghl).await?,
        clio: service_status(&state, Platform::Clio).await?,
    }))
}
