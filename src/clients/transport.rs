use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error};

use crate::audit::AuditTrail;
use crate::config::HttpConfig;
use crate::database::models::NewTransaction;
use crate::database::store::Store;
use crate::types::Platform;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    NotConfigured(&'static str),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Outcome of one upstream call. Non-2xx and transport failures are data, not errors.
#[derive(Debug, Clone)]
pub struct PlatformResponse {
    pub success: bool,
    pub status_code: Option<u16>,
    pub data: Value,
    pub headers: BTreeMap<String, String>,
    pub transaction_id: Option<i64>,
}

impl PlatformResponse {
    /// Upstream's own explanation, as surfaced in error messages
    pub fn message(&self) -> String {
        self.data
            .get("message")
            .or_else(|| self.data.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string()
    }
}

/// One request against an upstream platform
pub struct ApiRequest<'a> {
    pub platform: Platform,
    pub method: Method,
    pub url: String,
    pub bearer: Option<&'a str>,
    pub body: Option<&'a Value>,
    pub query: &'a [(String, String)],
}

/// Shared reqwest client that logs every call it makes
#[derive(Clone)]
pub struct Transport {
    http: reqwest::Client,
    audit: AuditTrail,
}

impl Transport {
    pub fn new(store: Arc<dyn Store>, config: &HttpConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            audit: AuditTrail::new(store),
        })
    }

    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    /// Log a request that never left because credentials are missing
    pub async fn not_configured(
        &self,
        platform: Platform,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        message: &'static str,
    ) -> ClientError {
        error!("{}", message);
        let tx_id = self
            .audit
            .transaction(
                NewTransaction::new(Platform::Internal, platform, method.as_str(), url)
                    .request(Some(json!({})), body.cloned())
                    .response(None, Some(json!({})), Some(json!({ "error": message })))
                    .duration_ms(0),
            )
            .await;
        self.audit.error(tx_id, "Configuration Error", message, None).await;
        ClientError::NotConfigured(message)
    }

    pub async fn send(&self, req: ApiRequest<'_>) -> PlatformResponse {
        let name = req.platform.display_name();
        let request_headers = logged_headers(req.bearer);

        let mut builder = self
            .http
            .request(req.method.clone(), &req.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(token) = req.bearer {
            builder = builder.bearer_auth(token);
        }
        if !req.query.is_empty() {
            builder = builder.query(req.query);
        }
        if let Some(body) = req.body {
            builder = builder.json(body);
        }

        debug!("{} {} {}", name, req.method, req.url);
        let started = Instant::now();

        let received = match builder.send().await {
            Ok(response) => read_response(response).await,
            Err(e) => Err(ClientError::Http(e)),
        };
        let duration_ms = elapsed_ms(started);

        match received {
            Ok((status, headers, text)) => {
                let data = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({ "text": text }));
                let success = (200..300).contains(&status);

                let tx_id = self
                    .audit
                    .transaction(
                        NewTransaction::new(Platform::Internal, req.platform, req.method.as_str(), &req.url)
                            .request(Some(request_headers), req.body.cloned())
                            .response(Some(status), Some(json!(headers)), Some(data.clone()))
                            .duration_ms(duration_ms)
                            .succeeded(success),
                    )
                    .await;

                if !success {
                    let message = format!("{} API request failed: {} - {}", name, status, text);
                    error!("{}", message);
                    self.audit
                        .error(
                            tx_id,
                            "API Response Error",
                            message,
                            Some(json!({ "status_code": status, "response": data })),
                        )
                        .await;
                }

                PlatformResponse {
                    success,
                    status_code: Some(status),
                    data,
                    headers,
                    transaction_id: tx_id,
                }
            }
            Err(e) => {
                let message = format!("{} API request exception: {}", name, e);
                error!("{}", message);

                let tx_id = self
                    .audit
                    .transaction(
                        NewTransaction::new(Platform::Internal, req.platform, req.method.as_str(), &req.url)
                            .request(Some(request_headers), req.body.cloned())
                            .response(None, Some(json!({})), Some(json!({ "error": e.to_string() })))
                            .duration_ms(duration_ms),
                    )
                    .await;
                self.audit
                    .error(
                        tx_id,
                        "Request Exception",
                        message,
                        Some(json!({ "exception_type": exception_type(&e) })),
                    )
                    .await;

                PlatformResponse {
                    success: false,
                    status_code: None,
                    data: json!({ "error": e.to_string() }),
                    headers: BTreeMap::new(),
                    transaction_id: tx_id,
                }
            }
        }
    }

    /// Form-encoded POST for OAuth token endpoints. Secrets stay out of the log.
    pub async fn post_form(&self, platform: Platform, url: &str, form: &[(&str, &str)]) -> PlatformResponse {
        let grant_type = form
            .iter()
            .find(|(k, _)| *k == "grant_type")
            .map(|(_, v)| *v)
            .unwrap_or("");
        let started = Instant::now();

        let result = self.http.post(url).header(ACCEPT, "application/json").form(form).send().await;

        let received = match result {
            Ok(response) => read_response(response).await,
            Err(e) => Err(ClientError::Http(e)),
        };
        let (status, headers, data) = match received {
            Ok((status, headers, text)) => {
                let data = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({ "text": text }));
                (Some(status), headers, data)
            }
            Err(e) => (None, BTreeMap::new(), json!({ "error": e.to_string() })),
        };
        let success = status.map_or(false, |s| (200..300).contains(&s));

        let tx_id = self
            .audit
            .transaction(
                NewTransaction::new(Platform::Internal, platform, "POST", url)
                    .request(
                        Some(json!({ "Content-Type": "application/x-www-form-urlencoded" })),
                        Some(json!({ "grant_type": grant_type })),
                    )
                    .response(status, Some(json!(headers)), Some(redact_tokens(&data)))
                    .duration_ms(elapsed_ms(started))
                    .succeeded(success),
            )
            .await;

        if !success {
            self.audit
                .error(
                    tx_id,
                    "OAuth Error",
                    format!("{} token request ({}) failed", platform.display_name(), grant_type),
                    Some(json!({ "status_code": status, "response": redact_tokens(&data) })),
                )
                .await;
        }

        PlatformResponse {
            success,
            status_code: status,
            data,
            headers,
            transaction_id: tx_id,
        }
    }
}

/// Join a base URL and an endpoint with exactly one slash between them
pub fn join_url(base: &str, endpoint: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), endpoint.trim_start_matches('/'))
}

/// Request headers as stored: the bearer token reduced to a fingerprint
fn logged_headers(bearer: Option<&str>) -> Value {
    let mut headers = Map::new();
    if let Some(token) = bearer {
        headers.insert("Authorization".into(), Value::String(fingerprint(token)));
    }
    headers.insert("Content-Type".into(), Value::String("application/json".into()));
    Value::Object(headers)
}

fn fingerprint(token: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(token.as_bytes()));
    format!("Bearer sha256:{}", &digest[..12])
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect()
}

/// Status, headers and body text; a body that cannot be read is a transport error
async fn read_response(
    response: reqwest::Response,
) -> Result<(u16, BTreeMap<String, String>, String), ClientError> {
    let status = response.status().as_u16();
    let headers = header_map(response.headers());
    let text = response.text().await?;
    Ok((status, headers, text))
}

fn elapsed_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}

fn exception_type(e: &ClientError) -> &'static str {
    let ClientError::Http(e) = e else {
        return "RequestException";
    };
    if e.is_timeout() {
        "Timeout"
    } else if e.is_connect() {
        "ConnectionError"
    } else if e.is_decode() || e.is_body() {
        "DecodeError"
    } else if e.is_request() {
        "RequestError"
    } else {
        "RequestException"
    }
}

fn redact_tokens(data: &Value) -> Value {
    let mut copy = data.clone();
    if let Value::Object(map) = &mut copy {
        for key in ["access_token", "refresh_token", "id_token"] {
            if let Some(v) = map.get_mut(key) {
                *v = Value::String("[redacted]".into());
            }
        }
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    fn transport(store: &MemoryStore) -> Transport {
        Transport::new(
            Arc::new(store.clone()),
            &HttpConfig {
                timeout_secs: 5,
                sync_concurrency: 1,
                bulk_page_size: 10,
            },
        )
        .unwrap()
    }

    #[test]
    fn joins_urls_with_one_slash() {
        assert_eq!(join_url("https://x/api/v4/", "contacts"), "https://x/api/v4/contacts");
        assert_eq!(join_url("https://x/api/v4", "/contacts/1"), "https://x/api/v4/contacts/1");
        assert_eq!(join_url("https://x/v1/", "contacts/"), "https://x/v1/contacts/");
    }

    #[test]
    fn tokens_never_reach_the_log() {
        let headers = logged_headers(Some("super-secret-token"));
        let auth = headers["Authorization"].as_str().unwrap();
        assert!(auth.starts_with("Bearer sha256:"));
        assert!(!auth.contains("super-secret-token"));

        let redacted = redact_tokens(&json!({ "access_token": "a", "refresh_token": "r", "expires_in": 3600 }));
        assert_eq!(redacted["access_token"], "[redacted]");
        assert_eq!(redacted["refresh_token"], "[redacted]");
        assert_eq!(redacted["expires_in"], 3600);
    }

    #[test]
    fn message_prefers_upstream_text() {
        let resp = PlatformResponse {
            success: false,
            status_code: Some(422),
            data: json!({ "message": "first_name is required" }),
            headers: BTreeMap::new(),
            transaction_id: None,
        };
        assert_eq!(resp.message(), "first_name is required");

        let bare = PlatformResponse { data: json!({}), ..resp };
        assert_eq!(bare.message(), "Unknown error");
    }

    #[tokio::test]
    async fn logs_successful_calls() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/contacts")
            .match_query(mockito::Matcher::UrlEncoded("query".into(), "a@b.com".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"contacts": []}"#)
            .create_async()
            .await;

        let store = MemoryStore::new();
        let query = vec![("query".to_string(), "a@b.com".to_string())];
        let resp = transport(&store)
            .send(ApiRequest {
                platform: Platform::Ghl,
                method: Method::GET,
                url: join_url(&server.url(), "contacts"),
                bearer: Some("key"),
                body: None,
                query: &query,
            })
            .await;

        mock.assert_async().await;
        assert!(resp.success);
        assert_eq!(resp.status_code, Some(200));

        let rows = store.transactions();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source, "internal");
        assert_eq!(rows[0].destination, "ghl");
        assert_eq!(rows[0].response_status, Some(200));
        assert!(rows[0].success);
        assert!(store.error_logs().is_empty());
    }

    #[tokio::test]
    async fn non_json_failures_are_wrapped_and_logged() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/contacts")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let store = MemoryStore::new();
        let body = json!({ "firstName": "Ada" });
        let resp = transport(&store)
            .send(ApiRequest {
                platform: Platform::Clio,
                method: Method::POST,
                url: join_url(&server.url(), "contacts"),
                bearer: Some("token"),
                body: Some(&body),
                query: &[],
            })
            .await;

        assert!(!resp.success);
        assert_eq!(resp.data, json!({ "text": "upstream exploded" }));

        let logs = store.error_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].error_type, "API Response Error");
        assert_eq!(logs[0].transaction_id, Some(1));
        assert!(logs[0].error_message.starts_with("Clio API request failed: 500"));
        assert_eq!(store.transactions()[0].request_body, Some(body));
    }

    #[tokio::test]
    async fn connection_failures_become_request_exceptions() {
        let store = MemoryStore::new();
        let resp = transport(&store)
            .send(ApiRequest {
                platform: Platform::Ghl,
                method: Method::GET,
                url: "http://127.0.0.1:9/contacts".to_string(),
                bearer: None,
                body: None,
                query: &[],
            })
            .await;

        assert!(!resp.success);
        assert_eq!(resp.status_code, None);
        assert!(resp.data.get("error").is_some());
        assert_eq!(store.error_types_logged(), vec!["Request Exception".to_string()]);
        assert_eq!(store.transactions()[0].response_status, None);
    }

    #[tokio::test]
    async fn truncated_bodies_become_request_exceptions() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\n{\"contacts\"")
                .await;
            let _ = socket.shutdown().await;
        });

        let store = MemoryStore::new();
        let resp = transport(&store)
            .send(ApiRequest {
                platform: Platform::Ghl,
                method: Method::GET,
                url: format!("http://{}/contacts", addr),
                bearer: None,
                body: None,
                query: &[],
            })
            .await;

        assert!(!resp.success);
        assert_eq!(resp.status_code, None);
        assert_eq!(store.error_types_logged(), vec!["Request Exception".to_string()]);
        assert_eq!(store.transactions()[0].response_status, None);
    }
}
