// handlers/protected/mappings/mod.rs - Field mapping CRUD, addressed by path id

pub mod mapping_delete;
pub mod mapping_put;
pub mod mappings_get;
pub mod mappings_post;

pub use mapping_delete::mapping_delete;
pub use mapping_put::mapping_put;
pub use mappings_get::mappings_get;
pub use mappings_post::mappings_post;

use std::collections::HashMap;

use crate::database::models::MappingType;
use crate::error::ApiError;

/// Field-level checks shared by create and update
pub(crate) fn validate_mapping(
    ghl_field: Option<&str>,
    clio_field: Option<&str>,
    mapping_type: Option<MappingType>,
    transform_logic: Option<&str>,
) -> Result<(), ApiError> {
    let mut field_errors = HashMap::new();
    if ghl_field.is_some_and(|f| f.trim().is_empty()) {
        field_errors.insert("ghl_field".to_string(), "This field is required".to_string());
    }
    if clio_field.is_some_and(|f| f.trim().is_empty()) {
        field_errors.insert("clio_field".to_string(), "This field is required".to_string());
    }
    if mapping_type == Some(MappingType::Transform) && transform_logic.map_or(true, |t| t.trim().is_empty()) {
        field_errors.insert(
            "transform_logic".to_string(),
            "Transform mappings need a transform".to_string(),
        );
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid data mapping", Some(field_errors)))
    }
}
