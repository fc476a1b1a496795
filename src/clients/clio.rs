use reqwest::Method;
use serde_json::Value;
use tracing::{info, warn};

use super::oauth::ClioOAuth;
use super::transport::{join_url, ApiRequest, ClientError, PlatformResponse, Transport};
use super::ContactQuery;
use crate::config::ClioConfig;
use crate::types::Platform;

#[derive(Clone)]
pub struct ClioClient {
    transport: Transport,
    defaults: ClioConfig,
    oauth: ClioOAuth,
}

#[derive(Debug, Clone)]
struct ClioCredentials {
    base_url: String,
    access_token: Option<String>,
    refresh_token: Option<String>,
    api_key: Option<String>,
    api_secret: Option<String>,
}

impl ClioCredentials {
    fn usable(&self) -> bool {
        self.access_token.is_some() || (self.api_key.is_some() && self.api_secret.is_some())
    }

    /// OAuth token only; an API key pair is never sent as the bearer
    fn bearer(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

impl ClioClient {
    pub fn new(transport: Transport, defaults: ClioConfig) -> Self {
        let oauth = ClioOAuth::new(transport.clone(), defaults.clone());
        Self {
            transport,
            defaults,
            oauth,
        }
    }

    pub fn oauth(&self) -> &ClioOAuth {
        &self.oauth
    }

    async fn credentials(&self) -> ClioCredentials {
        let defaults = ClioCredentials {
            base_url: self.defaults.base_url.clone(),
            access_token: self.defaults.access_token.clone(),
            refresh_token: None,
            api_key: self.defaults.api_key.clone(),
            api_secret: self.defaults.api_secret.clone(),
        };

        match self.transport.audit().store().get_api_config(Platform::Clio).await {
            Ok(Some(record)) if record.is_active => ClioCredentials {
                base_url: record.base_url.clone().unwrap_or(defaults.base_url),
                access_token: record.oauth_token.clone().or(defaults.access_token),
                refresh_token: record.refresh_token.clone(),
                api_key: record.api_key.clone().or(defaults.api_key),
                api_secret: record.api_secret.clone().or(defaults.api_secret),
            },
            Ok(_) => defaults,
            Err(e) => {
                warn!("Error loading Clio configuration: {}", e);
                defaults
            }
        }
    }

    /// True when a stored or configured OAuth access token is available
    pub async fn has_access_token(&self) -> bool {
        self.credentials().await.access_token.is_some()
    }

    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        query: &[(String, String)],
    ) -> Result<PlatformResponse, ClientError> {
        let creds = self.credentials().await;
        let url = join_url(&creds.base_url, endpoint);

        if !creds.usable() {
            return Err(self
                .transport
                .not_configured(Platform::Clio, &method, &url, body, "Clio API credentials not configured")
                .await);
        }

        let resp = self.send(&method, &url, creds.bearer(), body, query).await;
        if resp.status_code != Some(401) {
            return Ok(resp);
        }

        let Some(refresh_token) = creds.refresh_token.as_deref() else {
            return Ok(resp);
        };
        if !self.oauth.is_configured() {
            return Ok(resp);
        }

        match self.refresh_access_token(refresh_token).await {
            Ok(token) => Ok(self.send(&method, &url, Some(&token), body, query).await),
            Err(e) => {
                warn!("Clio token refresh failed: {}", e);
                Ok(resp)
            }
        }
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        bearer: Option<&str>,
        body: Option<&Value>,
        query: &[(String, String)],
    ) -> PlatformResponse {
        self.transport
            .send(ApiRequest {
                platform: Platform::Clio,
                method: method.clone(),
                url: url.to_string(),
                bearer,
                body,
                query,
            })
            .await
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ClientError> {
        let tokens = self.oauth.refresh(refresh_token).await?.into_tokens();
        let access_token = tokens.access_token.clone();
        if let Err(e) = self
            .transport
            .audit()
            .store()
            .store_oauth_tokens(Platform::Clio, tokens)
            .await
        {
            warn!("Failed to persist refreshed Clio token: {}", e);
        }
        info!("Refreshed Clio access token");
        Ok(access_token)
    }

    pub async fn test_connection(&self) -> Result<PlatformResponse, ClientError> {
        self.request(Method::GET, "users/who_am_i", None, &[]).await
    }

    pub async fn get_contacts(&self, query: &ContactQuery) -> Result<PlatformResponse, ClientError> {
        self.request(Method::GET, "contacts", None, &query.params()).await
    }

    pub async fn get_contact(&self, contact_id: &str) -> Result<PlatformResponse, ClientError> {
        self.request(Method::GET, &format!("contacts/{}", contact_id), None, &[]).await
    }

    pub async fn create_contact(&self, contact: &Value) -> Result<PlatformResponse, ClientError> {
        self.request(Method::POST, "contacts", Some(contact), &[]).await
    }

    pub async fn update_contact(&self, contact_id: &str, contact: &Value) -> Result<PlatformResponse, ClientError> {
        self.request(Method::PATCH, &format!("contacts/{}", contact_id), Some(contact), &[])
            .await
    }

    pub async fn create_matter(&self, matter: &Value) -> Result<PlatformResponse, ClientError> {
        self.request(Method::POST, "matters", Some(matter), &[]).await
    }

    pub async fn create_matter_for_contact(
        &self,
        contact_id: &str,
        matter: &Value,
    ) -> Result<PlatformResponse, ClientError> {
        self.request(Method::POST, &format!("contacts/{}/matters", contact_id), Some(matter), &[])
            .await
    }

    pub async fn create_task(&self, task: &Value) -> Result<PlatformResponse, ClientError> {
        self.request(Method::POST, "tasks", Some(task), &[]).await
    }

    pub async fn create_note(&self, note: &Value) -> Result<PlatformResponse, ClientError> {
        self.request(Method::POST, "notes", Some(note), &[]).await
    }
}
