// handlers/public/oauth/callback_get.rs - GET /api/clio-callback?code=
use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::clients::ClientError;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::Platform;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// Exchange the authorization code and keep the tokens in `api_configs`
pub async fn callback_get(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, ApiError> {
    if let Some(error) = query.error.as_deref() {
        warn!("Clio authorization declined: {}", error);
    }
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("Authorization code not received"))?;

    let tokens = state.clio().oauth().exchange_code(&code).await.map_err(|e| match e {
        ClientError::OAuth(msg) => ApiError::bad_request(format!("Failed to get access token: {}", msg)),
        other => other.into(),
    })?;

    state.store.store_oauth_tokens(Platform::Clio, tokens.into_tokens()).await?;
    info!("Stored Clio OAuth tokens");

    Ok(Redirect::to("/"))
}
