// handlers/protected/settings/mod.rs - Stored API credentials per service

pub mod settings_get;
pub mod settings_put;

pub use settings_get::settings_get;
pub use settings_put::settings_put;

use crate::database::models::ApiConfigStatus;
use crate::database::DatabaseError;
use crate::state::AppState;
use crate::types::Platform;

/// Status of the stored row, or of the environment credentials when no row exists
pub(crate) async fn service_status(state: &AppState, service: Platform) -> Result<ApiConfigStatus, DatabaseError> {
    if let Some(record) = state.store.get_api_config(service).await? {
        return Ok(record.status());
    }

    let mut status = ApiConfigStatus::missing(service.as_str());
    match service {
        Platform::Ghl => {
            status.configured = state.config.ghl.api_key.is_some();
            status.base_url = Some(state.config.ghl.base_url.clone());
            status.location_id = state.config.ghl.location_id.clone();
        }
        Platform::Clio => {
            let clio = &state.config.clio;
            status.configured = clio.access_token.is_some() || (clio.api_key.is_some() && clio.api_secret.is_some());
            status.has_oauth_token = clio.access_token.is_some();
            status.base_url = Some(clio.base_url.clone());
        }
        Platform::Internal => {}
    }
    Ok(status)
}
