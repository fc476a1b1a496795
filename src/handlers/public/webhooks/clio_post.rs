// handlers/public/webhooks/clio_post.rs - POST /api/clio-webhook
use axum::{body::Bytes, extract::State, Json};

use super::parse_payload;
use crate::error::ApiError;
use crate::services::SyncOutcome;
use crate::state::AppState;

pub async fn clio_webhook_post(State(state): State<AppState>, body: Bytes) -> Result<Json<SyncOutcome>, ApiError> {
    let payload = parse_payload(state.integration.audit(), "Clio Webhook Error", &body).await?;
    Ok(Json(state.integration.process_clio_webhook(&payload).await))
}
