// handlers/protected/mappings/mapping_put.rs - PUT /api/data-mappings/:id
use axum::extract::{Extension, Path, State};

use super::validate_mapping;
use crate::database::models::{DataMapping, DataMappingPatch};
use crate::middleware::{AdminUser, ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

pub async fn mapping_put(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<i64>,
    JsonBody(patch): JsonBody<DataMappingPatch>,
) -> ApiResult<DataMapping> {
    // The stored row may already carry the transform; only check what is sent together
    validate_mapping(
        patch.ghl_field.as_deref(),
        patch.clio_field.as_deref(),
        patch.transform_logic.as_ref().and(patch.mapping_type),
        patch.transform_logic.as_deref(),
    )?;

    let updated = state.store.update_mapping(id, patch).await?;
    tracing::info!("{} updated data mapping {}", admin.subject, id);
    Ok(ApiResponse::success(updated))
}
