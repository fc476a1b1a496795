use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    ApiConfigRecord, ApiConfigUpdate, DataMapping, DataMappingPatch, ErrorLog, ErrorLogFilter,
    MappingType, NewDataMapping, NewErrorLog, NewTransaction, OAuthTokens, Page, Transaction,
    TransactionFilter, TransactionStats,
};
use crate::database::store::Store;
use crate::types::Platform;

const TRANSACTION_COLUMNS: &str = "id, correlation_id, source, destination, request_method, request_url, \
     request_headers, request_body, response_status, response_headers, response_body, \
     duration_ms, success, created_at";

const ERROR_LOG_COLUMNS: &str =
    "id, transaction_id, error_type, error_message, error_details, created_at";

const API_CONFIG_COLUMNS: &str = "id, service, api_key, api_secret, base_url, oauth_token, token_expiry, \
     refresh_token, additional_config, is_active, created_at, updated_at";

const MAPPING_COLUMNS: &str =
    "id, ghl_field, clio_field, mapping_type, transform_logic, is_active, created_at, updated_at";

/// PostgreSQL-backed store using the shared pool from `DatabaseManager`
#[derive(Debug, Clone, Default)]
pub struct PgStore;

impl PgStore {
    pub fn new() -> Self {
        Self
    }

    async fn pool(&self) -> Result<PgPool, DatabaseError> {
        DatabaseManager::pool().await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check().await
    }

    async fn log_transaction(&self, tx: NewTransaction) -> Result<i64, DatabaseError> {
        let pool = self.pool().await?;
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO transactions
               (correlation_id, source, destination, request_method, request_url, request_headers,
                request_body, response_status, response_headers, response_body, duration_ms, success)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING id",
        )
        .bind(tx.correlation_id)
        .bind(tx.source.as_str())
        .bind(tx.destination.as_str())
        .bind(&tx.request_method)
        .bind(&tx.request_url)
        .bind(&tx.request_headers)
        .bind(&tx.request_body)
        .bind(tx.response_status.map(i32::from))
        .bind(&tx.response_headers)
        .bind(&tx.response_body)
        .bind(tx.duration_ms)
        .bind(tx.success)
        .fetch_one(&pool)
        .await?;
        Ok(id)
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Transaction>, DatabaseError> {
        let pool = self.pool().await?;
        let status = filter.status.map(|s| s.as_bool());
        let predicate = "($1::text IS NULL OR source = $1)
             AND ($2::text IS NULL OR destination = $2)
             AND ($3::boolean IS NULL OR success = $3)";

        let (total,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM transactions WHERE {predicate}"
        ))
        .bind(&filter.source)
        .bind(&filter.destination)
        .bind(status)
        .fetch_one(&pool)
        .await?;

        let items = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE {predicate}
             ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5"
        ))
        .bind(&filter.source)
        .bind(&filter.destination)
        .bind(status)
        .bind(per_page as i64)
        .bind(Page::<Transaction>::offset(page, per_page))
        .fetch_all(&pool)
        .await?;

        Ok(Page::new(items, page, per_page, total))
    }

    async fn recent_transactions(
        &self,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Transaction>, DatabaseError> {
        let pool = self.pool().await?;
        let rows = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             WHERE ($1::timestamptz IS NULL OR created_at > $1)
             ORDER BY created_at DESC, id DESC LIMIT $2"
        ))
        .bind(since)
        .bind(limit)
        .fetch_all(&pool)
        .await?;
        Ok(rows)
    }

    async fn transaction_stats(&self) -> Result<TransactionStats, DatabaseError> {
        let pool = self.pool().await?;
        let (total, successful): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE success) FROM transactions",
        )
        .fetch_one(&pool)
        .await?;
        Ok(TransactionStats {
            total,
            successful,
            failed: total - successful,
        })
    }

    async fn log_error(&self, error: NewErrorLog) -> Result<i64, DatabaseError> {
        let pool = self.pool().await?;
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO error_logs (transaction_id, error_type, error_message, error_details)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(error.transaction_id)
        .bind(&error.error_type)
        .bind(&error.error_message)
        .bind(&error.error_details)
        .fetch_one(&pool)
        .await?;
        Ok(id)
    }

    async fn list_error_logs(
        &self,
        filter: &ErrorLogFilter,
        page: u32,
        per_page: u32,
    ) -> Result<Page<ErrorLog>, DatabaseError> {
        let pool = self.pool().await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM error_logs WHERE ($1::text IS NULL OR error_type = $1)",
        )
        .bind(&filter.error_type)
        .fetch_one(&pool)
        .await?;

        let items = sqlx::query_as::<_, ErrorLog>(&format!(
            "SELECT {ERROR_LOG_COLUMNS} FROM error_logs
             WHERE ($1::text IS NULL OR error_type = $1)
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(&filter.error_type)
        .bind(per_page as i64)
        .bind(Page::<ErrorLog>::offset(page, per_page))
        .fetch_all(&pool)
        .await?;

        Ok(Page::new(items, page, per_page, total))
    }

    async fn error_types(&self) -> Result<Vec<String>, DatabaseError> {
        let pool = self.pool().await?;
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT error_type FROM error_logs ORDER BY error_type")
                .fetch_all(&pool)
                .await?;
        Ok(rows.into_iter().map(|(t,)| t).collect())
    }

    async fn recent_errors(
        &self,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<ErrorLog>, DatabaseError> {
        let pool = self.pool().await?;
        let rows = sqlx::query_as::<_, ErrorLog>(&format!(
            "SELECT {ERROR_LOG_COLUMNS} FROM error_logs
             WHERE ($1::timestamptz IS NULL OR created_at > $1)
             ORDER BY created_at DESC, id DESC LIMIT $2"
        ))
        .bind(since)
        .bind(limit)
        .fetch_all(&pool)
        .await?;
        Ok(rows)
    }

    async fn count_errors(&self, since: Option<DateTime<Utc>>) -> Result<i64, DatabaseError> {
        let pool = self.pool().await?;
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM error_logs WHERE ($1::timestamptz IS NULL OR created_at > $1)",
        )
        .bind(since)
        .fetch_one(&pool)
        .await?;
        Ok(count)
    }

    async fn get_api_config(&self, service: Platform) -> Result<Option<ApiConfigRecord>, DatabaseError> {
        let pool = self.pool().await?;
        let row = sqlx::query_as::<_, ApiConfigRecord>(&format!(
            "SELECT {API_CONFIG_COLUMNS} FROM api_configs WHERE service = $1"
        ))
        .bind(service.as_str())
        .fetch_optional(&pool)
        .await?;
        Ok(row)
    }

    async fn upsert_api_config(
        &self,
        service: Platform,
        update: ApiConfigUpdate,
    ) -> Result<ApiConfigRecord, DatabaseError> {
        let pool = self.pool().await?;
        let row = sqlx::query_as::<_, ApiConfigRecord>(&format!(
            "INSERT INTO api_configs (service, api_key, api_secret, base_url, additional_config, is_active)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (service) DO UPDATE SET
               api_key = EXCLUDED.api_key,
               api_secret = EXCLUDED.api_secret,
               base_url = EXCLUDED.base_url,
               additional_config = EXCLUDED.additional_config,
               is_active = EXCLUDED.is_active,
               updated_at = NOW()
             RETURNING {API_CONFIG_COLUMNS}"
        ))
        .bind(service.as_str())
        .bind(&update.api_key)
        .bind(&update.api_secret)
        .bind(&update.base_url)
        .bind(update.additional_config())
        .bind(update.is_active)
        .fetch_one(&pool)
        .await?;
        Ok(row)
    }

    async fn store_oauth_tokens(&self, service: Platform, tokens: OAuthTokens) -> Result<(), DatabaseError> {
        let pool = self.pool().await?;
        sqlx::query(
            "INSERT INTO api_configs (service, oauth_token, refresh_token, token_expiry, is_active)
             VALUES ($1, $2, $3, $4, TRUE)
             ON CONFLICT (service) DO UPDATE SET
               oauth_token = EXCLUDED.oauth_token,
               refresh_token = COALESCE(EXCLUDED.refresh_token, api_configs.refresh_token),
               token_expiry = EXCLUDED.token_expiry,
               updated_at = NOW()",
        )
        .bind(service.as_str())
        .bind(&tokens.access_token)
        .bind(&tokens.refresh_token)
        .bind(tokens.expires_at)
        .execute(&pool)
        .await?;
        Ok(())
    }

    async fn list_mappings(&self) -> Result<Vec<DataMapping>, DatabaseError> {
        let pool = self.pool().await?;
        let rows = sqlx::query_as::<_, DataMapping>(&format!(
            "SELECT {MAPPING_COLUMNS} FROM data_mappings ORDER BY id"
        ))
        .fetch_all(&pool)
        .await?;
        Ok(rows)
    }

    async fn active_mappings(&self, kind: MappingType) -> Result<Vec<DataMapping>, DatabaseError> {
        let pool = self.pool().await?;
        let rows = sqlx::query_as::<_, DataMapping>(&format!(
            "SELECT {MAPPING_COLUMNS} FROM data_mappings
             WHERE is_active AND mapping_type = $1 ORDER BY id"
        ))
        .bind(kind.as_str())
        .fetch_all(&pool)
        .await?;
        Ok(rows)
    }

    async fn create_mapping(&self, mapping: NewDataMapping) -> Result<DataMapping, DatabaseError> {
        let pool = self.pool().await?;
        let row = sqlx::query_as::<_, DataMapping>(&format!(
            "INSERT INTO data_mappings (ghl_field, clio_field, mapping_type, transform_logic, is_active)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {MAPPING_COLUMNS}"
        ))
        .bind(&mapping.ghl_field)
        .bind(&mapping.clio_field)
        .bind(mapping.mapping_type.as_str())
        .bind(&mapping.transform_logic)
        .bind(mapping.is_active)
        .fetch_one(&pool)
        .await?;
        Ok(row)
    }

    async fn update_mapping(&self, id: i64, patch: DataMappingPatch) -> Result<DataMapping, DatabaseError> {
        let pool = self.pool().await?;
        let mut mapping = sqlx::query_as::<_, DataMapping>(&format!(
            "SELECT {MAPPING_COLUMNS} FROM data_mappings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Mapping not found".to_string()))?;

        patch.apply(&mut mapping);

        let row = sqlx::query_as::<_, DataMapping>(&format!(
            "UPDATE data_mappings SET
               ghl_field = $2, clio_field = $3, mapping_type = $4,
               transform_logic = $5, is_active = $6, updated_at = NOW()
             WHERE id = $1
             RETURNING {MAPPING_COLUMNS}"
        ))
        .bind(id)
        .bind(&mapping.ghl_field)
        .bind(&mapping.clio_field)
        .bind(&mapping.mapping_type)
        .bind(&mapping.transform_logic)
        .bind(mapping.is_active)
        .fetch_one(&pool)
        .await?;
        Ok(row)
    }

    async fn delete_mapping(&self, id: i64) -> Result<(), DatabaseError> {
        let pool = self.pool().await?;
        let result = sqlx::query("DELETE FROM data_mappings WHERE id = $1")
            .bind(id)
            .execute(&pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Mapping not found".to_string()));
        }
        Ok(())
    }
}
