pub mod api_config;
pub mod data_mapping;
pub mod error_log;
pub mod transaction;

pub use api_config::{ApiConfigRecord, ApiConfigStatus, ApiConfigUpdate, OAuthTokens};
pub use data_mapping::{DataMapping, DataMappingPatch, MappingType, NewDataMapping};
pub use error_log::{ErrorLog, ErrorLogFilter, NewErrorLog};
pub use transaction::{NewTransaction, StatusFilter, Transaction, TransactionFilter, TransactionStats};

use serde::Serialize;

/// One page of a newest-first listing
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, per_page: u32, total: i64) -> Self {
        let per_page = per_page.max(1);
        let pages = ((total.max(0) as u64 + per_page as u64 - 1) / per_page as u64) as u32;
        Self {
            items,
            page: page.max(1),
            per_page,
            total,
            pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Row offset for a 1-based page number
    pub fn offset(page: u32, per_page: u32) -> i64 {
        (page.max(1) as i64 - 1) * per_page.max(1) as i64
    }
}
