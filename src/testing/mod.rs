//! In-memory `Store` and fixtures for unit tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use crate::clients::{ClioClient, GhlClient, Transport};
use crate::config::{AppConfig, ClioConfig, GhlConfig, HttpConfig};
use crate::database::manager::DatabaseError;
use crate::database::models::{
    ApiConfigRecord, ApiConfigUpdate, DataMapping, DataMappingPatch, ErrorLog, ErrorLogFilter,
    MappingType, NewDataMapping, NewErrorLog, NewTransaction, OAuthTokens, Page, Transaction,
    TransactionFilter, TransactionStats,
};
use crate::database::store::Store;
use crate::services::IntegrationService;
use crate::state::AppState;
use crate::types::Platform;

#[derive(Default)]
struct Tables {
    transactions: Vec<Transaction>,
    error_logs: Vec<ErrorLog>,
    api_configs: Vec<ApiConfigRecord>,
    mappings: Vec<DataMapping>,
}

#[derive(Default, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.tables.lock().unwrap().transactions.clone()
    }

    pub fn error_logs(&self) -> Vec<ErrorLog> {
        self.tables.lock().unwrap().error_logs.clone()
    }

    pub fn error_types_logged(&self) -> Vec<String> {
        self.error_logs().into_iter().map(|e| e.error_type).collect()
    }
}

fn newest_first<T: Clone>(rows: &[T], keep: impl Fn(&T) -> bool) -> Vec<T> {
    rows.iter().rev().filter(|r| keep(r)).cloned().collect()
}

fn paginate<T>(rows: Vec<T>, page: u32, per_page: u32) -> Page<T> {
    let total = rows.len() as i64;
    let offset = Page::<T>::offset(page, per_page) as usize;
    let items = rows.into_iter().skip(offset).take(per_page.max(1) as usize).collect();
    Page::new(items, page, per_page, total)
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn log_transaction(&self, tx: NewTransaction) -> Result<i64, DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.transactions.len() as i64 + 1;
        tables.transactions.push(Transaction {
            id,
            correlation_id: tx.correlation_id,
            source: tx.source.as_str().to_string(),
            destination: tx.destination.as_str().to_string(),
            request_method: tx.request_method,
            request_url: tx.request_url,
            request_headers: tx.request_headers,
            request_body: tx.request_body,
            response_status: tx.response_status.map(i32::from),
            response_headers: tx.response_headers,
            response_body: tx.response_body,
            duration_ms: tx.duration_ms,
            success: tx.success,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Transaction>, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        let rows = newest_first(&tables.transactions, |t| filter.matches(t));
        Ok(paginate(rows, page, per_page))
    }

    async fn recent_transactions(
        &self,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Transaction>, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        let mut rows = newest_first(&tables.transactions, |t| since.map_or(true, |s| t.created_at > s));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn transaction_stats(&self) -> Result<TransactionStats, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        let total = tables.transactions.len() as i64;
        let successful = tables.transactions.iter().filter(|t| t.success).count() as i64;
        Ok(TransactionStats {
            total,
            successful,
            failed: total - successful,
        })
    }

    async fn log_error(&self, error: NewErrorLog) -> Result<i64, DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.error_logs.len() as i64 + 1;
        tables.error_logs.push(ErrorLog {
            id,
            transaction_id: error.transaction_id,
            error_type: error.error_type,
            error_message: error.error_message,
            error_details: error.error_details,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_error_logs(
        &self,
        filter: &ErrorLogFilter,
        page: u32,
        per_page: u32,
    ) -> Result<Page<ErrorLog>, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        let rows = newest_first(&tables.error_logs, |e| filter.matches(e));
        Ok(paginate(rows, page, per_page))
    }

    async fn error_types(&self) -> Result<Vec<String>, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        let mut types: Vec<String> = tables.error_logs.iter().map(|e| e.error_type.clone()).collect();
        types.sort();
        types.dedup();
        Ok(types)
    }

    async fn recent_errors(
        &self,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<ErrorLog>, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        let mut rows = newest_first(&tables.error_logs, |e| since.map_or(true, |s| e.created_at > s));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn count_errors(&self, since: Option<DateTime<Utc>>) -> Result<i64, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .error_logs
            .iter()
            .filter(|e| since.map_or(true, |s| e.created_at > s))
            .count() as i64)
    }

    async fn get_api_config(&self, service: Platform) -> Result<Option<ApiConfigRecord>, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .api_configs
            .iter()
            .find(|c| c.service == service.as_str())
            .cloned())
    }

    async fn upsert_api_config(
        &self,
        service: Platform,
        update: ApiConfigUpdate,
    ) -> Result<ApiConfigRecord, DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let next_id = tables.api_configs.len() as i64 + 1;
        let additional = update.additional_config();
        let idx = match tables.api_configs.iter().position(|c| c.service == service.as_str()) {
            Some(idx) => idx,
            None => {
                tables.api_configs.push(blank_config(next_id, service, now));
                tables.api_configs.len() - 1
            }
        };
        let record = &mut tables.api_configs[idx];
        record.api_key = update.api_key;
        record.api_secret = update.api_secret;
        record.base_url = update.base_url;
        record.additional_config = Some(additional);
        record.is_active = update.is_active;
        record.updated_at = now;
        Ok(record.clone())
    }

    async fn store_oauth_tokens(&self, service: Platform, tokens: OAuthTokens) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let next_id = tables.api_configs.len() as i64 + 1;
        let idx = match tables.api_configs.iter().position(|c| c.service == service.as_str()) {
            Some(idx) => idx,
            None => {
                tables.api_configs.push(blank_config(next_id, service, now));
                tables.api_configs.len() - 1
            }
        };
        let record = &mut tables.api_configs[idx];
        record.oauth_token = Some(tokens.access_token);
        if tokens.refresh_token.is_some() {
            record.refresh_token = tokens.refresh_token;
        }
        record.token_expiry = tokens.expires_at;
        record.updated_at = now;
        Ok(())
    }

    async fn list_mappings(&self) -> Result<Vec<DataMapping>, DatabaseError> {
        Ok(self.tables.lock().unwrap().mappings.clone())
    }

    async fn active_mappings(&self, kind: MappingType) -> Result<Vec<DataMapping>, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .mappings
            .iter()
            .filter(|m| m.is_active && m.mapping_type == kind.as_str())
            .cloned()
            .collect())
    }

    async fn create_mapping(&self, mapping: NewDataMapping) -> Result<DataMapping, DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let id = tables.mappings.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        let row = DataMapping {
            id,
            ghl_field: mapping.ghl_field,
            clio_field: mapping.clio_field,
            mapping_type: mapping.mapping_type.as_str().to_string(),
            transform_logic: mapping.transform_logic,
            is_active: mapping.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.mappings.push(row.clone());
        Ok(row)
    }

    async fn update_mapping(&self, id: i64, patch: DataMappingPatch) -> Result<DataMapping, DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        let mapping = tables
            .mappings
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| DatabaseError::NotFound("Mapping not found".to_string()))?;
        patch.apply(mapping);
        mapping.updated_at = Utc::now();
        Ok(mapping.clone())
    }

    async fn delete_mapping(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.mappings.len();
        tables.mappings.retain(|m| m.id != id);
        if tables.mappings.len() == before {
            return Err(DatabaseError::NotFound("Mapping not found".to_string()));
        }
        Ok(())
    }
}

fn blank_config(id: i64, service: Platform, now: DateTime<Utc>) -> ApiConfigRecord {
    ApiConfigRecord {
        id,
        service: service.as_str().to_string(),
        api_key: None,
        api_secret: None,
        base_url: None,
        oauth_token: None,
        token_expiry: None,
        refresh_token: None,
        additional_config: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Config whose GHL and Clio base URLs point at a mock server
pub fn test_config(upstream: &str) -> AppConfig {
    let mut config = AppConfig::development();
    let base = format!("{}/", upstream.trim_end_matches('/'));
    config.ghl = GhlConfig {
        base_url: format!("{base}ghl/"),
        api_key: Some("ghl-test-key".to_string()),
        location_id: None,
    };
    config.clio = ClioConfig {
        base_url: format!("{base}clio/"),
        auth_url: format!("{base}oauth/authorize"),
        token_url: format!("{base}oauth/token"),
        client_id: Some("client-id".to_string()),
        client_secret: Some("client-secret".to_string()),
        redirect_uri: Some("http://localhost:5000/api/clio-callback".to_string()),
        access_token: Some("clio-test-token".to_string()),
        api_key: None,
        api_secret: None,
    };
    config.http = HttpConfig {
        timeout_secs: 5,
        sync_concurrency: 2,
        bulk_page_size: 100,
    };
    config
}

/// Clients and integration service wired to a memory store and mock upstream
pub struct Harness {
    pub store: MemoryStore,
    pub config: AppConfig,
    pub ghl: GhlClient,
    pub clio: ClioClient,
    pub integration: IntegrationService,
}

impl Harness {
    pub fn new(upstream: &str) -> Self {
        Self::with_config(test_config(upstream))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = MemoryStore::new();
        let shared: Arc<dyn Store> = Arc::new(store.clone());
        let transport = Transport::new(shared.clone(), &config.http).expect("http client");
        let ghl = GhlClient::new(transport.clone(), config.ghl.clone());
        let clio = ClioClient::new(transport, config.clio.clone());
        let integration = IntegrationService::new(
            shared,
            ghl.clone(),
            clio.clone(),
            config.http.sync_concurrency,
        );
        Self {
            store,
            config,
            ghl,
            clio,
            integration,
        }
    }
}

/// Router state over a fresh memory store
pub fn test_state(config: AppConfig) -> (MemoryStore, AppState) {
    let store = MemoryStore::new();
    let state = AppState::new(config, Arc::new(store.clone())).expect("http client");
    (store, state)
}
