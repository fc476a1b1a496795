// handlers/public/oauth/authorize_get.rs - GET /authorize
use axum::{extract::State, response::Redirect};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn authorize_get(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let url = state.clio().oauth().authorize_url()?;
    Ok(Redirect::to(&url))
}
