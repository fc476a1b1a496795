// handlers/protected/sync/test_transaction_post.rs - POST /api/add-test-transaction
use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::NewTransaction;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;
use crate::types::Platform;

#[derive(Debug, Default, Deserialize)]
pub struct TestTransactionRequest {
    pub source: Option<Platform>,
    pub destination: Option<Platform>,
}

/// Seed a successful sample row so the dashboard has something to show
pub async fn test_transaction_post(
    State(state): State<AppState>,
    body: Option<JsonBody<TestTransactionRequest>>,
) -> ApiResult<Value> {
    if !state.is_development() {
        return Err(ApiError::forbidden("Test transactions are only available in development"));
    }
    let req = body.map(|JsonBody(req)| req).unwrap_or_default();

    let tx = NewTransaction::new(
        req.source.unwrap_or(Platform::Ghl),
        req.destination.unwrap_or(Platform::Clio),
        "POST",
        "/api/test-endpoint",
    )
    .request(
        Some(json!({ "Content-Type": "application/json" })),
        Some(json!({ "name": "Test User", "email": "test@example.com" })),
    )
    .response(Some(200), None, Some(json!({ "id": "test-123", "status": "created" })))
    .duration_ms(150)
    .succeeded(true);

    let id = state.store.log_transaction(tx).await?;
    Ok(ApiResponse::created(json!({
        "transaction_id": id,
        "message": format!("Added test transaction with ID: {}", id)
    })))
}
