use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    ApiConfigRecord, ApiConfigUpdate, DataMapping, DataMappingPatch, ErrorLog, ErrorLogFilter,
    MappingType, NewDataMapping, NewErrorLog, NewTransaction, OAuthTokens, Page, Transaction,
    TransactionFilter, TransactionStats,
};
use crate::types::Platform;

/// Persistence seam for the transaction log, error log, settings and mappings
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;

    // Transaction log
    async fn log_transaction(&self, tx: NewTransaction) -> Result<i64, DatabaseError>;
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Transaction>, DatabaseError>;
    async fn recent_transactions(
        &self,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Transaction>, DatabaseError>;
    async fn transaction_stats(&self) -> Result<TransactionStats, DatabaseError>;

    // Error log
    async fn log_error(&self, error: NewErrorLog) -> Result<i64, DatabaseError>;
    async fn list_error_logs(
        &self,
        filter: &ErrorLogFilter,
        page: u32,
        per_page: u32,
    ) -> Result<Page<ErrorLog>, DatabaseError>;
    async fn error_types(&self) -> Result<Vec<String>, DatabaseError>;
    async fn recent_errors(
        &self,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<ErrorLog>, DatabaseError>;
    async fn count_errors(&self, since: Option<DateTime<Utc>>) -> Result<i64, DatabaseError>;

    // API settings
    async fn get_api_config(&self, service: Platform) -> Result<Option<ApiConfigRecord>, DatabaseError>;
    async fn upsert_api_config(
        &self,
        service: Platform,
        update: ApiConfigUpdate,
    ) -> Result<ApiConfigRecord, DatabaseError>;
    async fn store_oauth_tokens(&self, service: Platform, tokens: OAuthTokens) -> Result<(), DatabaseError>;

    // Field mappings
    async fn list_mappings(&self) -> Result<Vec<DataMapping>, DatabaseError>;
    async fn active_mappings(&self, kind: MappingType) -> Result<Vec<DataMapping>, DatabaseError>;
    async fn create_mapping(&self, mapping: NewDataMapping) -> Result<DataMapping, DatabaseError>;
    async fn update_mapping(&self, id: i64, patch: DataMappingPatch) -> Result<DataMapping, DatabaseError>;
    async fn delete_mapping(&self, id: i64) -> Result<(), DatabaseError>;
}
