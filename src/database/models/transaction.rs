use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::Platform;

/// One outbound or inbound API call as stored in `transactions`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: i64,
    pub correlation_id: Option<Uuid>,
    pub source: String,
    pub destination: String,
    pub request_method: String,
    pub request_url: String,
    pub request_headers: Option<Value>,
    pub request_body: Option<Value>,
    pub response_status: Option<i32>,
    pub response_headers: Option<Value>,
    pub response_body: Option<Value>,
    pub duration_ms: Option<i64>,
    pub success: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub correlation_id: Option<Uuid>,
    pub source: Platform,
    pub destination: Platform,
    pub request_method: String,
    pub request_url: String,
    pub request_headers: Option<Value>,
    pub request_body: Option<Value>,
    pub response_status: Option<u16>,
    pub response_headers: Option<Value>,
    pub response_body: Option<Value>,
    pub duration_ms: Option<i64>,
    pub success: bool,
}

impl NewTransaction {
    pub fn new(
        source: Platform,
        destination: Platform,
        method: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id: None,
            source,
            destination,
            request_method: method.into(),
            request_url: url.into(),
            request_headers: None,
            request_body: None,
            response_status: None,
            response_headers: None,
            response_body: None,
            duration_ms: None,
            success: false,
        }
    }

    pub fn correlated(mut self, correlation_id: Option<Uuid>) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    pub fn request(mut self, headers: Option<Value>, body: Option<Value>) -> Self {
        self.request_headers = headers;
        self.request_body = body;
        self
    }

    pub fn response(mut self, status: Option<u16>, headers: Option<Value>, body: Option<Value>) -> Self {
        self.response_status = status;
        self.response_headers = headers;
        self.response_body = body;
        self
    }

    pub fn duration_ms(mut self, ms: i64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn succeeded(mut self, success: bool) -> Self {
        self.success = success;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Success,
    Failure,
}

impl StatusFilter {
    /// Unknown values mean "no status filter", as the dashboard dropdown sends "" for all
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(StatusFilter::Success),
            "failure" => Some(StatusFilter::Failure),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> bool {
        matches!(self, StatusFilter::Success)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub status: Option<StatusFilter>,
}

impl TransactionFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        self.source.as_deref().map_or(true, |s| tx.source == s)
            && self.destination.as_deref().map_or(true, |d| tx.destination == d)
            && self.status.map_or(true, |s| tx.success == s.as_bool())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TransactionStats {
    pub total: i64,
    pub successful: i64,
    pub failed: i64,
}

impl TransactionStats {
    /// Percentage of successful transactions, 0 when nothing has been logged yet
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.successful as f64 / self.total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_handles_empty_log() {
        assert_eq!(TransactionStats::default().success_rate(), 0.0);
        let stats = TransactionStats { total: 4, successful: 3, failed: 1 };
        assert_eq!(stats.success_rate(), 75.0);
    }

    #[test]
    fn status_filter_ignores_unknown_values() {
        assert_eq!(StatusFilter::parse("success"), Some(StatusFilter::Success));
        assert_eq!(StatusFilter::parse("failure"), Some(StatusFilter::Failure));
        assert_eq!(StatusFilter::parse(""), None);
        assert_eq!(StatusFilter::parse("all"), None);
    }
}
