// handlers/public/webhooks/ghl_post.rs - POST /api/ghl-webhook
use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::error;

use super::parse_payload;
use crate::audit::with_correlation;
use crate::error::ApiError;
use crate::services::{IntakeError, IntakeOutcome};
use crate::state::AppState;
use crate::types::Platform;

/// Contact events (`event` present) go to the sync pipeline; anything else is
/// a voice-AI call report handled by intake.
///
/// Intake answers 200 even when Clio refuses the contact (`clio_contact` is
/// null and `clio_matter` carries the error).
/// Only a missing Clio token (401) or a transport failure (500) is an error.
pub async fn ghl_webhook_post(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let audit = state.integration.audit();
    let payload = parse_payload(audit, "GHL Webhook Error", &body).await?;

    if payload.get("event").is_some() {
        let outcome = state.integration.process_ghl_webhook(&payload).await;
        return Ok(Json(outcome).into_response());
    }

    let (correlation_id, (receipt, result)) = with_correlation(async {
        let receipt = state.integration.record_receipt(Platform::Ghl, &payload).await;
        (receipt, state.intake.process(&payload).await)
    })
    .await;

    match result {
        Ok(IntakeOutcome::Rejected) => Ok(Json(json!({
            "status": "success",
            "message": "Call handled - case rejected by AI agent",
            "correlation_id": correlation_id
        }))
        .into_response()),
        Ok(IntakeOutcome::Forwarded {
            contact,
            matter,
            practice_area,
        }) => Ok(Json(json!({
            "status": "success",
            "message": "Data forwarded to Clio",
            "clio_contact": contact,
            "clio_matter": matter,
            "practice_area": practice_area,
            "correlation_id": correlation_id
        }))
        .into_response()),
        Err(IntakeError::NotAuthenticated { auth_url }) => Err(ApiError::ClioNotAuthenticated { auth_url }),
        Err(e) => {
            let message = e.to_string();
            error!("Error processing GHL call webhook: {}", message);
            audit
                .error(receipt, "GHL Webhook Error", &message, Some(webhook_details(&payload)))
                .await;
            Err(ApiError::internal_server_error(message))
        }
    }
}

fn webhook_details(payload: &Value) -> Value {
    json!({ "webhook_data": payload })
}
