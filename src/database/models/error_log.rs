use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ErrorLog {
    pub id: i64,
    pub transaction_id: Option<i64>,
    pub error_type: String,
    pub error_message: String,
    pub error_details: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewErrorLog {
    pub transaction_id: Option<i64>,
    pub error_type: String,
    pub error_message: String,
    pub error_details: Option<Value>,
}

impl NewErrorLog {
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            transaction_id: None,
            error_type: error_type.into(),
            error_message: error_message.into(),
            error_details: None,
        }
    }

    pub fn for_transaction(mut self, transaction_id: Option<i64>) -> Self {
        self.transaction_id = transaction_id;
        self
    }

    pub fn details(mut self, details: Value) -> Self {
        self.error_details = Some(details);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ErrorLogFilter {
    pub error_type: Option<String>,
}

impl ErrorLogFilter {
    pub fn matches(&self, log: &ErrorLog) -> bool {
        self.error_type.as_deref().map_or(true, |t| log.error_type == t)
    }
}
