//! HTTP clients for GoHighLevel and Clio.
//!
//! Both clients resolve credentials per request (stored `api_configs` row over
//! environment defaults) and send through one [`Transport`], which logs a
//! transaction for every call.

pub mod clio;
pub mod ghl;
pub mod oauth;
pub mod transport;

pub use clio::ClioClient;
pub use ghl::GhlClient;
pub use oauth::{ClioOAuth, TokenSet};
pub use transport::{ApiRequest, ClientError, PlatformResponse, Transport};

/// Listing parameters shared by both contact endpoints
#[derive(Debug, Clone, Default)]
pub struct ContactQuery {
    pub query: Option<String>,
    pub limit: Option<u32>,
}

impl ContactQuery {
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            limit: None,
        }
    }

    pub fn limit(limit: u32) -> Self {
        Self {
            query: None,
            limit: Some(limit),
        }
    }

    pub(crate) fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(q) = &self.query {
            params.push(("query".to_string(), q.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}
