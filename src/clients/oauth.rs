use chrono::{Duration, Utc};
use serde::Deserialize;
use url::Url;

use super::transport::{ClientError, Transport};
use crate::config::ClioConfig;
use crate::database::models::OAuthTokens;
use crate::types::Platform;

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenSet {
    pub fn into_tokens(self) -> OAuthTokens {
        OAuthTokens {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

/// Clio authorization-code flow
#[derive(Clone)]
pub struct ClioOAuth {
    transport: Transport,
    config: ClioConfig,
}

impl ClioOAuth {
    pub fn new(transport: Transport, config: ClioConfig) -> Self {
        Self { transport, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.client_id.is_some() && self.config.client_secret.is_some()
    }

    pub fn authorize_url(&self) -> Result<String, ClientError> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or(ClientError::NotConfigured("Clio OAuth client not configured"))?;
        let mut params = vec![("response_type", "code"), ("client_id", client_id)];
        if let Some(redirect_uri) = self.config.redirect_uri.as_deref() {
            params.push(("redirect_uri", redirect_uri));
        }
        let url = Url::parse_with_params(&self.config.auth_url, &params)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.config.auth_url, e)))?;
        Ok(url.to_string())
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, ClientError> {
        let mut form = vec![("grant_type", "authorization_code"), ("code", code)];
        if let Some(redirect_uri) = self.config.redirect_uri.as_deref() {
            form.push(("redirect_uri", redirect_uri));
        }
        self.token_request(form).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, ClientError> {
        self.token_request(vec![("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .await
    }

    async fn token_request<'a>(&'a self, mut form: Vec<(&'a str, &'a str)>) -> Result<TokenSet, ClientError> {
        let (Some(client_id), Some(client_secret)) =
            (self.config.client_id.as_deref(), self.config.client_secret.as_deref())
        else {
            return Err(ClientError::NotConfigured("Clio OAuth client not configured"));
        };
        form.push(("client_id", client_id));
        form.push(("client_secret", client_secret));

        let resp = self
            .transport
            .post_form(Platform::Clio, &self.config.token_url, &form)
            .await;
        if !resp.success {
            return Err(ClientError::OAuth(format!(
                "token request failed ({}): {}",
                resp.status_code.map_or_else(|| "no response".to_string(), |s| s.to_string()),
                resp.message()
            )));
        }
        serde_json::from_value(resp.data).map_err(|e| ClientError::OAuth(format!("malformed token response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_config, MemoryStore};
    use mockito::Matcher;
    use std::sync::Arc;

    fn oauth(upstream: &str, store: &MemoryStore) -> ClioOAuth {
        let config = test_config(upstream);
        let transport = Transport::new(Arc::new(store.clone()), &config.http).unwrap();
        ClioOAuth::new(transport, config.clio)
    }

    #[test]
    fn authorize_url_carries_client_and_redirect() {
        let url = oauth("http://clio.test", &MemoryStore::new()).authorize_url().unwrap();
        assert!(url.starts_with("http://clio.test/oauth/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5000%2Fapi%2Fclio-callback"));
    }

    #[tokio::test]
    async fn exchanges_code_without_logging_secrets() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "abc".into()),
                Matcher::UrlEncoded("client_secret".into(), "client-secret".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token": "new-token", "refresh_token": "r1", "expires_in": 3600, "token_type": "bearer"}"#)
            .create_async()
            .await;

        let store = MemoryStore::new();
        let tokens = oauth(&server.url(), &store).exchange_code("abc").await.unwrap();

        mock.assert_async().await;
        assert_eq!(tokens.access_token, "new-token");
        let stored = tokens.into_tokens();
        assert!(stored.expires_at.is_some());

        let row = &store.transactions()[0];
        let logged = serde_json::to_string(row).unwrap();
        assert!(!logged.contains("new-token"));
        assert!(!logged.contains("client-secret"));
        assert!(row.success);
    }

    #[tokio::test]
    async fn rejected_exchange_is_an_oauth_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant"}"#)
            .create_async()
            .await;

        let store = MemoryStore::new();
        let err = oauth(&server.url(), &store).refresh("stale").await.unwrap_err();

        assert!(matches!(err, ClientError::OAuth(_)));
        assert!(err.to_string().contains("invalid_grant"));
        assert_eq!(store.error_types_logged(), vec!["OAuth Error".to_string()]);
    }
}
