// handlers/public/webhooks/mod.rs - Inbound webhooks from GHL and Clio
//
// Bodies are read raw so malformed JSON can still be recorded in the error log.

pub mod clio_post;
pub mod ghl_post;

pub use clio_post::clio_webhook_post;
pub use ghl_post::ghl_webhook_post;

use axum::body::Bytes;
use serde_json::{json, Value};

use crate::audit::AuditTrail;
use crate::error::ApiError;

/// Parse a webhook body, logging `error_type` when it is not JSON
pub(crate) async fn parse_payload(audit: &AuditTrail, error_type: &str, body: &Bytes) -> Result<Value, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(payload) => Ok(payload),
        Err(e) => {
            let message = format!("Invalid webhook payload: {}", e);
            tracing::warn!("{}", message);
            audit
                .error(None, error_type, &message, Some(json!({ "body": String::from_utf8_lossy(body) })))
                .await;
            Err(ApiError::invalid_json(message))
        }
    }
}
