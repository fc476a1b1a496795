// handlers/protected/mappings/mappings_get.rs - GET /api/data-mappings
use axum::extract::State;

use crate::database::models::DataMapping;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn mappings_get(State(state): State<AppState>) -> ApiResult<Vec<DataMapping>> {
    Ok(ApiResponse::success(state.store.list_mappings().await?))
}
