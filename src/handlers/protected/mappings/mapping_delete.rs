// handlers/protected/mappings/mapping_delete.rs - DELETE /api/data-mappings/:id
use axum::extract::{Extension, Path, State};
use serde_json::{json, Value};

use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn mapping_delete(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    state.store.delete_mapping(id).await?;
    tracing::info!("{} deleted data mapping {}", admin.subject, id);
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
