use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

/// Stored credentials for one external service. Secrets never serialize.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApiConfigRecord {
    pub id: i64,
    pub service: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    #[serde(skip_serializing)]
    pub api_secret: Option<String>,
    pub base_url: Option<String>,
    #[serde(skip_serializing)]
    pub oauth_token: Option<String>,
    pub token_expiry: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub additional_config: Option<Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApiConfigRecord {
    pub fn location_id(&self) -> Option<String> {
        self.additional_config
            .as_ref()
            .and_then(|c| c.get("location_id"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn status(&self) -> ApiConfigStatus {
        ApiConfigStatus {
            service: self.service.clone(),
            configured: self.api_key.is_some() || self.oauth_token.is_some(),
            has_oauth_token: self.oauth_token.is_some(),
            token_expiry: self.token_expiry,
            base_url: self.base_url.clone(),
            location_id: self.location_id(),
            is_active: self.is_active,
            updated_at: Some(self.updated_at),
        }
    }
}

/// Dashboard view of a service's configuration
#[derive(Debug, Clone, Serialize)]
pub struct ApiConfigStatus {
    pub service: String,
    pub configured: bool,
    pub has_oauth_token: bool,
    pub token_expiry: Option<DateTime<Utc>>,
    pub base_url: Option<String>,
    pub location_id: Option<String>,
    pub is_active: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApiConfigStatus {
    pub fn missing(service: &str) -> Self {
        Self {
            service: service.to_string(),
            configured: false,
            has_oauth_token: false,
            token_expiry: None,
            base_url: None,
            location_id: None,
            is_active: false,
            updated_at: None,
        }
    }
}

/// Settings form payload. Replaces the stored values; OAuth tokens are untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfigUpdate {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ApiConfigUpdate {
    pub fn additional_config(&self) -> Value {
        match self.location_id.as_deref().filter(|s| !s.is_empty()) {
            Some(location_id) => json!({ "location_id": location_id }),
            None => json!({}),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}
