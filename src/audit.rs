//! Transaction and error logging that never fails the caller.
//!
//! Every webhook or sync request runs inside [`with_correlation`], so each row
//! written while handling it carries the same `correlation_id`.

use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::database::models::{NewErrorLog, NewTransaction};
use crate::database::store::Store;

tokio::task_local! {
    static CORRELATION_ID: Uuid;
}

/// Run `fut` with a fresh correlation id; returns the id alongside the output
pub async fn with_correlation<F: Future>(fut: F) -> (Uuid, F::Output) {
    let id = Uuid::new_v4();
    let output = CORRELATION_ID.scope(id, fut).await;
    (id, output)
}

pub fn current_correlation() -> Option<Uuid> {
    CORRELATION_ID.try_with(|id| *id).ok()
}

#[derive(Clone)]
pub struct AuditTrail {
    store: Arc<dyn Store>,
}

impl AuditTrail {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Record a transaction; `None` when the log table is unavailable
    pub async fn transaction(&self, tx: NewTransaction) -> Option<i64> {
        let correlation = tx.correlation_id.or_else(current_correlation);
        match self.store.log_transaction(tx.correlated(correlation)).await {
            Ok(id) => Some(id),
            Err(e) => {
                error!("Error logging transaction: {}", e);
                None
            }
        }
    }

    pub async fn error(
        &self,
        transaction_id: Option<i64>,
        error_type: &str,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Option<i64> {
        let mut entry = NewErrorLog::new(error_type, message).for_transaction(transaction_id);
        if let Some(details) = details {
            entry = entry.details(details);
        }
        match self.store.log_error(entry).await {
            Ok(id) => Some(id),
            Err(e) => {
                error!("Error logging error: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use crate::types::Platform;

    #[tokio::test]
    async fn rows_written_inside_a_scope_share_its_id() {
        let store = MemoryStore::new();
        let audit = AuditTrail::new(Arc::new(store.clone()));

        let (id, _) = with_correlation(async {
            audit
                .transaction(NewTransaction::new(Platform::Ghl, Platform::Internal, "POST", "webhook/ghl"))
                .await;
            audit
                .transaction(NewTransaction::new(Platform::Internal, Platform::Clio, "GET", "contacts"))
                .await;
        })
        .await;

        audit
            .transaction(NewTransaction::new(Platform::Internal, Platform::Ghl, "GET", "contacts"))
            .await;

        let rows = store.transactions();
        assert_eq!(rows[0].correlation_id, Some(id));
        assert_eq!(rows[1].correlation_id, Some(id));
        assert_eq!(rows[2].correlation_id, None);
    }

    #[tokio::test]
    async fn error_rows_link_to_their_transaction() {
        let store = MemoryStore::new();
        let audit = AuditTrail::new(Arc::new(store.clone()));

        let tx = audit
            .transaction(NewTransaction::new(Platform::Internal, Platform::Clio, "GET", "contacts"))
            .await;
        audit.error(tx, "API Error", "boom", None).await;

        let logs = store.error_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].transaction_id, tx);
        assert_eq!(logs[0].error_type, "API Error");
    }
}
