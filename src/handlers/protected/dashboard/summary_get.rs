// handlers/protected/dashboard/summary_get.rs - GET /api/logs/summary
use axum::extract::State;
use serde::Serialize;

use crate::database::models::{ErrorLog, Transaction};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LogSummary {
    pub total_transactions: i64,
    pub total_errors: i64,
    pub recent_transactions: Vec<Transaction>,
    pub recent_errors: Vec<ErrorLog>,
}

pub async fn summary_get(State(state): State<AppState>) -> ApiResult<LogSummary> {
    let stats = state.store.transaction_stats().await?;

    Ok(ApiResponse::success(LogSummary {
        total_transactions: stats.total,
        total_errors: state.store.count_errors(None).await?,
        recent_transactions: state.store.recent_transactions(None, 10).await?,
        recent_errors: state.store.recent_errors(None, 5).await?,
    }))
}
