// handlers/protected/dashboard/logs_get.rs - GET /api/logs
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use super::{non_blank, PER_PAGE};
use crate::database::models::{ErrorLog, ErrorLogFilter, Page};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    pub error_type: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ErrorLogView {
    pub logs: Page<ErrorLog>,
    /// Distinct values for the filter dropdown
    pub error_types: Vec<String>,
}

pub async fn logs_get(State(state): State<AppState>, Query(query): Query<LogsQuery>) -> ApiResult<ErrorLogView> {
    let filter = ErrorLogFilter {
        error_type: non_blank(query.error_type),
    };
    let logs = state
        .store
        .list_error_logs(&filter, query.page.unwrap_or(1), PER_PAGE)
        .await?;
    let error_types = state.store.error_types().await?;

    Ok(ApiResponse::success(ErrorLogView { logs, error_types }))
}
