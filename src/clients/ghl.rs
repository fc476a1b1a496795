use reqwest::Method;
use serde_json::Value;
use tracing::warn;

use super::transport::{join_url, ApiRequest, ClientError, PlatformResponse, Transport};
use super::ContactQuery;
use crate::config::GhlConfig;
use crate::types::Platform;

#[derive(Clone)]
pub struct GhlClient {
    transport: Transport,
    defaults: GhlConfig,
}

/// Effective credentials for one call
#[derive(Debug, Clone)]
struct GhlCredentials {
    base_url: String,
    api_key: Option<String>,
    location_id: Option<String>,
}

impl GhlClient {
    pub fn new(transport: Transport, defaults: GhlConfig) -> Self {
        Self { transport, defaults }
    }

    async fn credentials(&self) -> GhlCredentials {
        let defaults = GhlCredentials {
            base_url: self.defaults.base_url.clone(),
            api_key: self.defaults.api_key.clone(),
            location_id: self.defaults.location_id.clone(),
        };

        match self.transport.audit().store().get_api_config(Platform::Ghl).await {
            Ok(Some(record)) if record.is_active => GhlCredentials {
                base_url: record.base_url.clone().unwrap_or(defaults.base_url),
                api_key: record.api_key.clone().or(defaults.api_key),
                location_id: record.location_id().or(defaults.location_id),
            },
            Ok(_) => defaults,
            Err(e) => {
                warn!("Error loading GHL configuration: {}", e);
                defaults
            }
        }
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

        let Some(api_key) = creds.api_key.as_deref() else {
            return Err(self
                .transport
                .not_configured(Platform::Ghl, &method, &url, body, "GHL API key not configured")
                .await);
        };

        Ok(self
            .transport
            .send(ApiRequest {
                platform: Platform::Ghl,
                method,
                url,
                bearer: Some(api_key),
                body,
                query,
            })
            .await)
    }

    pub async fn test_connection(&self) -> Result<PlatformResponse, ClientError> {
        let endpoint = match self.credentials().await.location_id {
            Some(location_id) => format!("locations/{}", location_id),
            None => "locations/".to_string(),
        };
        self.request(Method::GET, &endpoint, None, &[]).await
    }

    pub async fn get_contacts(&self, query: &ContactQuery) -> Result<PlatformResponse, ClientError> {
        let mut params = query.params();
        if let Some(location_id) = self.credentials().await.location_id {
            params.push(("locationId".to_string(), location_id));
        }
        self.request(Method::GET, "contacts/", None, &params).await
    }

    pub async fn get_contact(&self, contact_id: &str) -> Result<PlatformResponse, ClientError> {
        self.request(Method::GET, &format!("contacts/{}", contact_id), None, &[]).await
    }

    pub async fn create_contact(&self, contact: &Value) -> Result<PlatformResponse, ClientError> {
        self.request(Method::POST, "contacts/", Some(contact), &[]).await
    }

    pub async fn update_contact(&self, contact_id: &str, contact: &Value) -> Result<PlatformResponse, ClientError> {
        self.request(Method::PUT, &format!("contacts/{}", contact_id), Some(contact), &[])
            .await
    }

    pub async fn create_opportunity(&self, opportunity: &Value) -> Result<PlatformResponse, ClientError> {
        self.request(Method::POST, "opportunities/", Some(opportunity), &[]).await
    }

    pub async fn create_task(&self, task: &Value) -> Result<PlatformResponse, ClientError> {
        self.request(Method::POST, "tasks/", Some(task), &[]).await
    }

    pub async fn create_note(&self, note: &Value) -> Result<PlatformResponse, ClientError> {
        self.request(Method::POST, "notes/", Some(note), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use crate::clients::ContactQuery;
    use crate::database::models::ApiConfigUpdate;
    use crate::database::store::Store;
    use crate::testing::Harness;
    use crate::types::Platform;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn contact_search_carries_query_and_location() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ghl/contacts/")
            .match_header("authorization", "Bearer ghl-test-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "ada@example.com".into()),
                Matcher::UrlEncoded("locationId".into(), "loc-1".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"contacts": [{"id": "g1"}]}"#)
            .create_async()
            .await;

        let mut config = crate::testing::test_config(&server.url());
        config.ghl.location_id = Some("loc-1".to_string());
        let h = Harness::with_config(config);

        let resp = h.ghl.get_contacts(&ContactQuery::search("ada@example.com")).await.unwrap();

        mock.assert_async().await;
        assert!(resp.success);
        assert_eq!(resp.data["contacts"][0]["id"], "g1");
    }

    #[tokio::test]
    async fn stored_settings_override_environment() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ghl/locations/stored-loc")
            .match_header("authorization", "Bearer stored-key")
            .with_status(200)
            .with_body(r#"{"location": {}}"#)
            .create_async()
            .await;

        let h = Harness::new(&server.url());
        h.store
            .upsert_api_config(
                Platform::Ghl,
                ApiConfigUpdate {
                    api_key: Some("stored-key".to_string()),
                    api_secret: None,
                    base_url: None,
                    location_id: Some("stored-loc".to_string()),
                    is_active: true,
                },
            )
            .await
            .unwrap();

        let resp = h.ghl.test_connection().await.unwrap();

        mock.assert_async().await;
        assert!(resp.success);
    }

    #[tokio::test]
    async fn missing_key_is_a_configuration_error() {
        let mut config = crate::testing::test_config("http://127.0.0.1:9");
        config.ghl.api_key = None;
        let h = Harness::with_config(config);

        let err = h.ghl.create_contact(&json!({ "firstName": "Ada" })).await.unwrap_err();

        assert_eq!(err.to_string(), "GHL API key not configured");
        assert_eq!(h.store.error_types_logged(), vec!["Configuration Error".to_string()]);
        let rows = h.store.transactions();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].success);
        assert_eq!(rows[0].destination, "ghl");
    }
}
