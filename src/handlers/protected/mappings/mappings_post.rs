// handlers/protected/mappings/mappings_post.rs - POST /api/data-mappings
use axum::extract::{Extension, State};

use super::validate_mapping;
use crate::database::models::{DataMapping, NewDataMapping};
use crate::middleware::{AdminUser, ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

pub async fn mappings_post(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    JsonBody(mapping): JsonBody<NewDataMapping>,
) -> ApiResult<DataMapping> {
    validate_mapping(
        Some(&mapping.ghl_field),
        Some(&mapping.clio_field),
        Some(mapping.mapping_type),
        mapping.transform_logic.as_deref(),
    )?;

    let created = state.store.create_mapping(mapping).await?;
    tracing::info!(
        "{} created data mapping {} -> {}",
        admin.subject, created.ghl_field, created.clio_field
    );
    Ok(ApiResponse::created(created))
}
