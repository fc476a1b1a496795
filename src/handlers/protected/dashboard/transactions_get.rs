// handlers/protected/dashboard/transactions_get.rs - GET /api/transactions
use axum::extract::{Query, State};
use serde::Deserialize;

use super::{non_blank, PER_PAGE};
use crate::database::models::{Page, StatusFilter, Transaction, TransactionFilter};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
}

impl TransactionsQuery {
    fn filter(self) -> (TransactionFilter, u32) {
        let filter = TransactionFilter {
            source: non_blank(self.source),
            destination: non_blank(self.destination),
            status: self.status.as_deref().and_then(StatusFilter::parse),
        };
        (filter, self.page.unwrap_or(1))
    }
}

/// Newest first, filtered by source, destination and success/failure
pub async fn transactions_get(
    State(state): State<AppState>,
    Query(query): Query<TransactionsQuery>,
) -> ApiResult<Page<Transaction>> {
    let (filter, page) = query.filter();
    let transactions = state.store.list_transactions(&filter, page, PER_PAGE).await?;
    Ok(ApiResponse::success(transactions))
}
