use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::mapping::{clio_to_ghl_contact, contact_email, ghl_to_clio_contact, MappingError};
use crate::audit::{with_correlation, AuditTrail};
use crate::clients::{ClientError, ClioClient, ContactQuery, GhlClient, PlatformResponse};
use crate::database::models::{DataMapping, MappingType, NewTransaction};
use crate::database::store::Store;
use crate::types::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    #[default]
    GhlToClio,
    ClioToGhl,
}

impl SyncDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ghl_to_clio" => Some(SyncDirection::GhlToClio),
            "clio_to_ghl" => Some(SyncDirection::ClioToGhl),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncDirection::GhlToClio => "ghl_to_clio",
            SyncDirection::ClioToGhl => "clio_to_ghl",
        }
    }

    pub fn source(&self) -> Platform {
        match self {
            SyncDirection::GhlToClio => Platform::Ghl,
            SyncDirection::ClioToGhl => Platform::Clio,
        }
    }

    pub fn destination(&self) -> Platform {
        match self {
            SyncDirection::GhlToClio => Platform::Clio,
            SyncDirection::ClioToGhl => Platform::Ghl,
        }
    }

    /// Request URL recorded when a sync fails unexpectedly
    fn operation_path(&self) -> &'static str {
        match self {
            SyncDirection::GhlToClio => "sync/ghl-to-clio",
            SyncDirection::ClioToGhl => "sync/clio-to-ghl",
        }
    }
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{0}")]
    Webhook(String),

    #[error("{0}")]
    Api(String),

    #[error("{0}")]
    Mapping(String),

    #[error("{0}")]
    Sync(String),

    #[error("{0}")]
    Configuration(String),

    /// Anything the handlers did not anticipate; recorded as a failed internal transaction
    #[error("{0}")]
    Internal(String),
}

impl SyncError {
    /// Value stored in `error_logs.error_type`
    pub fn category(&self) -> &'static str {
        match self {
            SyncError::Webhook(_) => "Webhook Processing Error",
            SyncError::Api(_) => "API Error",
            SyncError::Mapping(_) => "Data Mapping Error",
            SyncError::Sync(_) | SyncError::Internal(_) => "Sync Error",
            SyncError::Configuration(_) => "Configuration Error",
        }
    }
}

impl From<ClientError> for SyncError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::NotConfigured(msg) => SyncError::Configuration(msg.to_string()),
            other => SyncError::Api(other.to_string()),
        }
    }
}

impl From<MappingError> for SyncError {
    fn from(e: MappingError) -> Self {
        SyncError::Mapping(e.to_string())
    }
}

/// Per-contact line of a bulk sync
#[derive(Debug, Clone, Serialize)]
pub struct ContactSyncResult {
    pub source_id: Option<String>,
    pub success: bool,
    pub result: Value,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ContactSyncResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl SyncOutcome {
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    fn synced(message: String, source_id: &str, result: Value) -> Self {
        Self {
            source_id: Some(source_id.to_string()),
            result: Some(result),
            ..Self::done(message)
        }
    }
}

/// Moves contacts between GHL and Clio and records what happened
#[derive(Clone)]
pub struct IntegrationService {
    audit: AuditTrail,
    ghl: GhlClient,
    clio: ClioClient,
    concurrency: usize,
    page_size: Option<u32>,
}

impl IntegrationService {
    pub fn new(store: Arc<dyn Store>, ghl: GhlClient, clio: ClioClient, concurrency: usize) -> Self {
        Self {
            audit: AuditTrail::new(store),
            ghl,
            clio,
            concurrency: concurrency.max(1),
            page_size: None,
        }
    }

    /// Cap on contacts fetched per bulk sync
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    pub fn ghl(&self) -> &GhlClient {
        &self.ghl
    }

    pub fn clio(&self) -> &ClioClient {
        &self.clio
    }

    // ---- webhooks ---------------------------------------------------------

    pub async fn process_ghl_webhook(&self, payload: &Value) -> SyncOutcome {
        self.process_webhook(Platform::Ghl, payload).await
    }

    pub async fn process_clio_webhook(&self, payload: &Value) -> SyncOutcome {
        self.process_webhook(Platform::Clio, payload).await
    }

    async fn process_webhook(&self, source: Platform, payload: &Value) -> SyncOutcome {
        let (correlation_id, mut outcome) = with_correlation(async {
            let receipt = self.record_receipt(source, payload).await;
            let handled = match source {
                Platform::Clio => self.handle_clio_event(payload).await,
                _ => self.handle_ghl_event(payload).await,
            };
            match handled {
                Ok(outcome) => SyncOutcome {
                    transaction_id: receipt,
                    ..outcome
                },
                Err(SyncError::Internal(msg)) => {
                    let message = format!("Error processing {} webhook: {}", source.display_name(), msg);
                    error!("{}", message);
                    let tx = self
                        .record_internal_failure(source, "webhook/process", payload.clone(), &msg)
                        .await;
                    self.audit
                        .error(tx, "Webhook Processing Error", &message, Some(json!({ "webhook_data": payload })))
                        .await;
                    SyncOutcome {
                        transaction_id: tx,
                        ..SyncOutcome::failed(message)
                    }
                }
                Err(e) => {
                    warn!("{} webhook not processed: {}", source.display_name(), e);
                    self.audit.error(receipt, e.category(), e.to_string(), None).await;
                    SyncOutcome {
                        transaction_id: receipt,
                        ..SyncOutcome::failed(e.to_string())
                    }
                }
            }
        })
        .await;
        outcome.correlation_id = Some(correlation_id);
        outcome
    }

    /// Log that a webhook arrived; the returned id links later error rows to it
    pub async fn record_receipt(&self, source: Platform, payload: &Value) -> Option<i64> {
        self.audit
            .transaction(
                NewTransaction::new(source, Platform::Internal, "POST", format!("webhook/{}", source))
                    .request(Some(json!({})), Some(payload.clone()))
                    .response(Some(200), Some(json!({})), Some(json!({ "status": "received" })))
                    .duration_ms(0)
                    .succeeded(true),
            )
            .await
    }

    async fn handle_ghl_event(&self, payload: &Value) -> Result<SyncOutcome, SyncError> {
        if !payload.is_object() {
            return Err(SyncError::Internal("webhook payload is not a JSON object".into()));
        }
        let event = payload.get("event").and_then(Value::as_str).unwrap_or("");
        if event != "contact_created" && event != "contact_updated" {
            return Ok(SyncOutcome::done(format!(
                "Webhook received but no action taken for event type: {}",
                event
            )));
        }

        let contact_id = payload
            .pointer("/resource/id")
            .and_then(id_string)
            .ok_or_else(|| SyncError::Webhook("Contact ID missing in webhook data".into()))?;

        let contact = self.fetch_ghl_contact(&contact_id).await?;
        let clio_contact = ghl_to_clio_contact(&contact, &self.mappings().await)?;

        let resp = if event == "contact_created" {
            self.clio.create_contact(&clio_contact).await?
        } else {
            self.upsert(Platform::Clio, &clio_contact).await?
        };
        let data = require(resp, "Failed to create/update contact in Clio")?;

        info!("Processed GHL {} for contact {}", event, contact_id);
        Ok(SyncOutcome::synced(
            format!("Successfully processed {} webhook", event),
            &contact_id,
            data,
        ))
    }

    async fn handle_clio_event(&self, payload: &Value) -> Result<SyncOutcome, SyncError> {
        if !payload.is_object() {
            return Err(SyncError::Internal("webhook payload is not a JSON object".into()));
        }
        let event = payload.get("type").and_then(Value::as_str).unwrap_or("");
        if event != "Contact.created" && event != "Contact.updated" {
            return Ok(SyncOutcome::done(format!(
                "Webhook received but no action taken for event type: {}",
                event
            )));
        }

        let resource = payload.get("data").cloned().unwrap_or(Value::Null);
        let contact_id = resource
            .get("id")
            .and_then(id_string)
            .ok_or_else(|| SyncError::Webhook("Contact ID missing in webhook data".into()))?;

        let contact = if resource.get("attributes").map_or(false, |a| !a.is_null()) {
            resource
        } else {
            self.fetch_clio_contact(&contact_id).await?
        };
        let ghl_contact = clio_to_ghl_contact(&contact)?;
        let resp = self.upsert(Platform::Ghl, &ghl_contact).await?;
        let data = require(resp, "Failed to create/update contact in GHL")?;

        info!("Processed Clio {} for contact {}", event, contact_id);
        Ok(SyncOutcome::synced(
            format!("Successfully processed {} webhook", event),
            &contact_id,
            data,
        ))
    }

    // ---- manual sync ------------------------------------------------------

    /// Sync one contact (`entity_id`) or the source's contact list
    pub async fn sync(&self, direction: SyncDirection, entity_type: &str, entity_id: Option<&str>) -> SyncOutcome {
        let (correlation_id, mut outcome) = with_correlation(async {
            let result = if entity_type != "contact" {
                Err(SyncError::Sync(format!("Unsupported entity type: {}", entity_type)))
            } else {
                match entity_id.filter(|id| !id.is_empty()) {
                    Some(id) => self.sync_one(direction, id).await,
                    None => self.sync_all(direction).await,
                }
            };

            match result {
                Ok(outcome) => outcome,
                Err(SyncError::Internal(msg)) => {
                    let message = format!(
                        "Error syncing {} to {}: {}",
                        direction.source().display_name(),
                        direction.destination().display_name(),
                        msg
                    );
                    error!("{}", message);
                    let details = json!({ "entity_type": entity_type, "entity_id": entity_id });
                    let tx = self
                        .record_internal_failure(Platform::Internal, direction.operation_path(), details.clone(), &msg)
                        .await;
                    self.audit.error(tx, "Sync Error", &message, Some(details)).await;
                    SyncOutcome {
                        transaction_id: tx,
                        ..SyncOutcome::failed(message)
                    }
                }
                Err(e) => {
                    error!("{} sync failed: {}", direction, e);
                    self.audit
                        .error(
                            None,
                            e.category(),
                            e.to_string(),
                            Some(json!({ "direction": direction, "entity_type": entity_type, "entity_id": entity_id })),
                        )
                        .await;
                    SyncOutcome::failed(e.to_string())
                }
            }
        })
        .await;
        outcome.correlation_id = Some(correlation_id);
        outcome
    }

    async fn sync_one(&self, direction: SyncDirection, id: &str) -> Result<SyncOutcome, SyncError> {
        let (source, destination) = (direction.source().display_name(), direction.destination().display_name());
        let data = match direction {
            SyncDirection::GhlToClio => {
                let contact = self.fetch_ghl_contact(id).await?;
                let mapped = ghl_to_clio_contact(&contact, &self.mappings().await)?;
                let resp = self.upsert(Platform::Clio, &mapped).await?;
                require(resp, "Failed to sync contact to Clio")?
            }
            SyncDirection::ClioToGhl => {
                let contact = self.fetch_clio_contact(id).await?;
                let mapped = clio_to_ghl_contact(&contact)?;
                let resp = self.upsert(Platform::Ghl, &mapped).await?;
                require(resp, "Failed to sync contact to GHL")?
            }
        };
        Ok(SyncOutcome::synced(
            format!("Successfully synced contact from {} to {}", source, destination),
            id,
            data,
        ))
    }

    async fn sync_all(&self, direction: SyncDirection) -> Result<SyncOutcome, SyncError> {
        let query = self.page_size.map(ContactQuery::limit).unwrap_or_default();
        let (contacts, mappings) = match direction {
            SyncDirection::GhlToClio => {
                let resp = self.ghl.get_contacts(&query).await?;
                let data = require(resp, "Failed to fetch contacts from GHL")?;
                (list_at(&data, "contacts")?, self.mappings().await)
            }
            SyncDirection::ClioToGhl => {
                let resp = self.clio.get_contacts(&query).await?;
                let data = require(resp, "Failed to fetch contacts from Clio")?;
                (list_at(&data, "data")?, Vec::new())
            }
        };

        let mappings = &mappings;
        let results: Vec<ContactSyncResult> = stream::iter(contacts)
            .map(|contact| async move { self.sync_listed(direction, contact, mappings).await })
            .buffered(self.concurrency)
            .collect()
            .await;

        let succeeded = results.iter().filter(|r| r.success).count();
        info!(
            "Bulk {} sync: {} of {} contacts succeeded",
            direction,
            succeeded,
            results.len()
        );

        let message = format!(
            "Synced {} contacts from {} to {}",
            results.len(),
            direction.source().display_name(),
            direction.destination().display_name()
        );
        Ok(SyncOutcome {
            results: Some(results),
            ..SyncOutcome::done(message)
        })
    }

    async fn sync_listed(&self, direction: SyncDirection, contact: Value, mappings: &[DataMapping]) -> ContactSyncResult {
        let source_id = contact.get("id").and_then(id_string);
        let attempt = async {
            let resp = match direction {
                SyncDirection::GhlToClio => {
                    let mapped = ghl_to_clio_contact(&contact, mappings)?;
                    self.upsert(Platform::Clio, &mapped).await?
                }
                SyncDirection::ClioToGhl => {
                    let mapped = clio_to_ghl_contact(&contact)?;
                    self.upsert(Platform::Ghl, &mapped).await?
                }
            };
            Ok::<_, SyncError>(resp)
        };

        match attempt.await {
            Ok(resp) => ContactSyncResult {
                source_id,
                success: resp.success,
                result: resp.data,
            },
            Err(e) => {
                self.audit
                    .error(None, e.category(), e.to_string(), Some(json!({ "source_id": source_id })))
                    .await;
                ContactSyncResult {
                    source_id,
                    success: false,
                    result: json!({ "error": e.to_string() }),
                }
            }
        }
    }

    // ---- connection checks -----------------------------------------------

    pub async fn test_connection(&self, service: Platform) -> SyncOutcome {
        let resp = match service {
            Platform::Ghl => self.ghl.test_connection().await,
            Platform::Clio => self.clio.test_connection().await,
            Platform::Internal => return SyncOutcome::failed("Invalid service specified"),
        };
        match resp {
            Ok(resp) if resp.success => {
                SyncOutcome::done(format!("Successfully connected to {}", service.as_str().to_uppercase()))
            }
            Ok(resp) => SyncOutcome::failed(format!(
                "Connection to {} failed: {}",
                service.display_name(),
                resp.message()
            )),
            Err(e) => SyncOutcome::failed(e.to_string()),
        }
    }

    // ---- helpers ----------------------------------------------------------

    async fn fetch_ghl_contact(&self, id: &str) -> Result<Value, SyncError> {
        let resp = self.ghl.get_contact(id).await?;
        let data = require(resp, "Failed to fetch contact from GHL")?;
        match data.get("contact") {
            Some(contact) if contact.is_object() => Ok(contact.clone()),
            _ => Err(SyncError::Mapping("GHL response did not include a contact".into())),
        }
    }

    async fn fetch_clio_contact(&self, id: &str) -> Result<Value, SyncError> {
        let resp = self.clio.get_contact(id).await?;
        require(resp, "Failed to fetch contact from Clio")
    }

    /// Update the first destination contact with the same email, else create
    async fn upsert(&self, destination: Platform, contact: &Value) -> Result<PlatformResponse, SyncError> {
        let existing = match contact_email(contact) {
            Some(email) => self.find_by_email(destination, &email).await?,
            None => None,
        };

        let resp = match (destination, existing) {
            (Platform::Clio, Some(id)) => self.clio.update_contact(&id, contact).await?,
            (Platform::Clio, None) => self.clio.create_contact(contact).await?,
            (_, Some(id)) => self.ghl.update_contact(&id, contact).await?,
            (_, None) => self.ghl.create_contact(contact).await?,
        };
        Ok(resp)
    }

    async fn find_by_email(&self, platform: Platform, email: &str) -> Result<Option<String>, SyncError> {
        let query = ContactQuery::search(email);
        let (resp, key) = match platform {
            Platform::Clio => (self.clio.get_contacts(&query).await?, "data"),
            _ => (self.ghl.get_contacts(&query).await?, "contacts"),
        };
        if !resp.success {
            return Ok(None);
        }
        Ok(resp
            .data
            .get(key)
            .and_then(Value::as_array)
            .and_then(|list| list.first())
            .and_then(|first| first.get("id"))
            .and_then(id_string))
    }

    async fn mappings(&self) -> Vec<DataMapping> {
        match self.audit.store().active_mappings(MappingType::Direct).await {
            Ok(mut direct) => {
                match self.audit.store().active_mappings(MappingType::Transform).await {
                    Ok(transform) => direct.extend(transform),
                    Err(e) => warn!("Error getting transform mappings: {}", e),
                }
                direct
            }
            Err(e) => {
                warn!("Error getting field mappings: {}", e);
                Vec::new()
            }
        }
    }

    async fn record_internal_failure(&self, source: Platform, path: &str, body: Value, msg: &str) -> Option<i64> {
        self.audit
            .transaction(
                NewTransaction::new(source, Platform::Internal, "POST", path)
                    .request(Some(json!({})), Some(body))
                    .response(Some(500), Some(json!({})), Some(json!({ "error": msg })))
                    .duration_ms(0),
            )
            .await
    }
}

/// Body of a successful response, or an API error carrying upstream's message
fn require(resp: PlatformResponse, context: &str) -> Result<Value, SyncError> {
    if resp.success {
        Ok(resp.data)
    } else {
        Err(SyncError::Api(format!("{}: {}", context, resp.message())))
    }
}

fn list_at(data: &Value, key: &str) -> Result<Vec<Value>, SyncError> {
    match data.get(key) {
        Some(Value::Array(items)) => Ok(items.clone()),
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(_) => Err(SyncError::Internal(format!("unexpected '{}' in contact list response", key))),
    }
}

/// GHL ids are strings, Clio ids are numbers
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewDataMapping;
    use crate::testing::Harness;
    use mockito::Matcher;

    #[test]
    fn directions_parse_strictly() {
        assert_eq!(SyncDirection::parse("ghl_to_clio"), Some(SyncDirection::GhlToClio));
        assert_eq!(SyncDirection::parse("clio_to_ghl"), Some(SyncDirection::ClioToGhl));
        assert_eq!(SyncDirection::parse("sideways"), None);
        assert_eq!(SyncDirection::default(), SyncDirection::GhlToClio);
    }

    #[test]
    fn client_errors_keep_their_category() {
        let e: SyncError = ClientError::NotConfigured("GHL API key not configured").into();
        assert_eq!(e.category(), "Configuration Error");
        let e: SyncError = MappingError::NotAnObject("GHL").into();
        assert_eq!(e.category(), "Data Mapping Error");
    }

    #[tokio::test]
    async fn ghl_contact_created_creates_in_clio() {
        let mut server = mockito::Server::new_async().await;
        let fetch = server
            .mock("GET", "/ghl/contacts/g-1")
            .with_status(200)
            .with_body(r#"{"contact": {"id": "g-1", "firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com"}}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/clio/contacts")
            .match_body(Matcher::PartialJson(json!({
                "data": { "type": "contacts", "attributes": { "first_name": "Ada", "last_name": "Lovelace" } }
            })))
            .with_status(201)
            .with_body(r#"{"data": {"id": 501}}"#)
            .create_async()
            .await;

        let h = Harness::new(&server.url());
        let outcome = h
            .integration
            .process_ghl_webhook(&json!({ "event": "contact_created", "resource": { "id": "g-1" } }))
            .await;

        fetch.assert_async().await;
        create.assert_async().await;
        assert!(outcome.success, "{:?}", outcome);
        assert_eq!(outcome.source_id.as_deref(), Some("g-1"));
        assert_eq!(outcome.result, Some(json!({ "data": { "id": 501 } })));

        let rows = h.store.transactions();
        assert_eq!(rows.len(), 3);
        assert_eq!((rows[0].source.as_str(), rows[0].request_url.as_str()), ("ghl", "webhook/ghl"));
        assert!(rows.iter().all(|r| r.correlation_id == outcome.correlation_id));
    }

    #[tokio::test]
    async fn ghl_contact_updated_updates_first_match() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ghl/contacts/g-2")
            .with_status(200)
            .with_body(r#"{"contact": {"id": "g-2", "firstName": "Ada", "email": "ada@example.com"}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/clio/contacts")
            .match_query(Matcher::UrlEncoded("query".into(), "ada@example.com".into()))
            .with_status(200)
            .with_body(r#"{"data": [{"id": 77}, {"id": 78}]}"#)
            .create_async()
            .await;
        let update = server
            .mock("PATCH", "/clio/contacts/77")
            .with_status(200)
            .with_body(r#"{"data": {"id": 77}}"#)
            .create_async()
            .await;
        let create = server.mock("POST", "/clio/contacts").expect(0).create_async().await;

        let h = Harness::new(&server.url());
        let outcome = h
            .integration
            .process_ghl_webhook(&json!({ "event": "contact_updated", "resource": { "id": "g-2" } }))
            .await;

        update.assert_async().await;
        create.assert_async().await;
        assert!(outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("Successfully processed contact_updated webhook"));
    }

    #[tokio::test]
    async fn missing_resource_id_is_logged_against_receipt() {
        let h = Harness::new("http://127.0.0.1:9");
        let outcome = h
            .integration
            .process_ghl_webhook(&json!({ "event": "contact_created", "resource": {} }))
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Contact ID missing in webhook data"));

        let logs = h.store.error_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].error_type, "Webhook Processing Error");
        assert_eq!(logs[0].transaction_id, outcome.transaction_id);
        assert!(outcome.transaction_id.is_some());
    }

    #[tokio::test]
    async fn unknown_events_are_acknowledged() {
        let h = Harness::new("http://127.0.0.1:9");
        let outcome = h
            .integration
            .process_ghl_webhook(&json!({ "event": "appointment_booked" }))
            .await;

        assert!(outcome.success);
        assert_eq!(
            outcome.message.as_deref(),
            Some("Webhook received but no action taken for event type: appointment_booked")
        );
        assert_eq!(h.store.transactions().len(), 1);
    }

    #[tokio::test]
    async fn upstream_failure_is_an_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ghl/contacts/g-3")
            .with_status(404)
            .with_body(r#"{"message": "Contact not found"}"#)
            .create_async()
            .await;

        let h = Harness::new(&server.url());
        let outcome = h
            .integration
            .process_ghl_webhook(&json!({ "event": "contact_created", "resource": { "id": "g-3" } }))
            .await;

        assert_eq!(
            outcome.error.as_deref(),
            Some("Failed to fetch contact from GHL: Contact not found")
        );
        assert_eq!(
            h.store.error_types_logged(),
            vec!["API Response Error".to_string(), "API Error".to_string()]
        );
    }

    #[tokio::test]
    async fn clio_webhook_with_attributes_skips_fetch() {
        let mut server = mockito::Server::new_async().await;
        let fetch = server.mock("GET", "/clio/contacts/9").expect(0).create_async().await;
        server
            .mock("GET", "/ghl/contacts/")
            .match_query(Matcher::UrlEncoded("query".into(), "grace@navy.mil".into()))
            .with_status(200)
            .with_body(r#"{"contacts": []}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/ghl/contacts/")
            .match_body(Matcher::PartialJson(json!({ "firstName": "Grace", "email": "grace@navy.mil" })))
            .with_status(200)
            .with_body(r#"{"contact": {"id": "g-9"}}"#)
            .create_async()
            .await;

        let h = Harness::new(&server.url());
        let outcome = h
            .integration
            .process_clio_webhook(&json!({
                "type": "Contact.created",
                "data": {
                    "id": 9,
                    "attributes": { "first_name": "Grace", "emails": [{ "address": "grace@navy.mil" }] }
                }
            }))
            .await;

        fetch.assert_async().await;
        create.assert_async().await;
        assert!(outcome.success, "{:?}", outcome);
        assert_eq!(outcome.source_id.as_deref(), Some("9"));
        assert_eq!(h.store.transactions()[0].source, "clio");
    }

    #[tokio::test]
    async fn clio_webhook_without_attributes_fetches_contact() {
        let mut server = mockito::Server::new_async().await;
        let fetch = server
            .mock("GET", "/clio/contacts/9")
            .with_status(200)
            .with_body(r#"{"data": {"id": 9, "first_name": "Grace", "last_name": "Hopper", "emails": [{"address": "grace@navy.mil"}]}}"#)
            .expect(1)
            .create_async()
            .await;
        server
            .mock("GET", "/ghl/contacts/")
            .match_query(Matcher::UrlEncoded("query".into(), "grace@navy.mil".into()))
            .with_status(200)
            .with_body(r#"{"contacts": [{"id": "g-9"}, {"id": "g-10"}]}"#)
            .create_async()
            .await;
        let update = server
            .mock("PUT", "/ghl/contacts/g-9")
            .match_body(Matcher::PartialJson(json!({ "firstName": "Grace", "lastName": "Hopper" })))
            .with_status(200)
            .with_body(r#"{"contact": {"id": "g-9"}}"#)
            .create_async()
            .await;

        let h = Harness::new(&server.url());
        let outcome = h
            .integration
            .process_clio_webhook(&json!({ "type": "Contact.updated", "data": { "id": 9 } }))
            .await;

        fetch.assert_async().await;
        update.assert_async().await;
        assert!(outcome.success, "{:?}", outcome);
        assert_eq!(outcome.source_id.as_deref(), Some("9"));
        let urls: Vec<_> = h.store.transactions().iter().map(|r| r.request_url.clone()).collect();
        assert!(urls[1].ends_with("/clio/contacts/9"));
        assert!(urls[3].ends_with("/ghl/contacts/g-9"));
    }

    #[tokio::test]
    async fn ghl_response_without_contact_is_a_mapping_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ghl/contacts/g-4")
            .with_status(200)
            .with_body(r#"{"meta": {}}"#)
            .create_async()
            .await;
        let create = server.mock("POST", "/clio/contacts").expect(0).create_async().await;

        let h = Harness::new(&server.url());
        let outcome = h
            .integration
            .process_ghl_webhook(&json!({ "event": "contact_created", "resource": { "id": "g-4" } }))
            .await;

        create.assert_async().await;
        assert_eq!(outcome.error.as_deref(), Some("GHL response did not include a contact"));
        assert_eq!(h.store.error_types_logged(), vec!["Data Mapping Error".to_string()]);
        assert!(h.store.transactions().iter().all(|r| r.request_url != "webhook/process"));
    }

    #[tokio::test]
    async fn non_object_payload_records_internal_failure() {
        let h = Harness::new("http://127.0.0.1:9");
        let outcome = h.integration.process_clio_webhook(&json!(["not", "an", "object"])).await;

        assert!(!outcome.success);
        let rows = h.store.transactions();
        let failure = rows.iter().find(|r| r.request_url == "webhook/process").unwrap();
        assert_eq!(failure.response_status, Some(500));
        assert_eq!(outcome.transaction_id, Some(failure.id));
        assert_eq!(h.store.error_types_logged(), vec!["Webhook Processing Error".to_string()]);
    }

    #[tokio::test]
    async fn bulk_sync_upserts_every_listed_contact() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ghl/contacts/")
            .match_query(Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"contacts": [{"id": "a", "firstName": "A"}, {"id": "b", "firstName": "B"}, {"id": "c", "firstName": "C"}]}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/clio/contacts")
            .with_status(201)
            .with_body(r#"{"data": {"id": 1}}"#)
            .expect(3)
            .create_async()
            .await;

        let h = Harness::new(&server.url());
        h.store
            .create_mapping(NewDataMapping {
                ghl_field: "companyName".into(),
                clio_field: "company_name".into(),
                mapping_type: MappingType::Direct,
                transform_logic: None,
                is_active: true,
            })
            .await
            .unwrap();

        let outcome = h.integration.sync(SyncDirection::GhlToClio, "contact", None).await;

        create.assert_async().await;
        assert!(outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("Synced 3 contacts from GHL to Clio"));
        let results = outcome.results.unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.source_id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(results.iter().all(|r| r.success));
    }

    #[tokio::test]
    async fn bulk_sync_reports_each_failure_and_continues() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ghl/contacts/")
            .match_query(Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"contacts": [{"id": "a", "firstName": "A"}, "garbage", {"id": "b", "firstName": "B"}]}"#)
            .create_async()
            .await;
        let accepted = server
            .mock("POST", "/clio/contacts")
            .match_body(Matcher::PartialJson(json!({ "data": { "attributes": { "first_name": "A" } } })))
            .with_status(201)
            .with_body(r#"{"data": {"id": 1}}"#)
            .expect(1)
            .create_async()
            .await;
        let refused = server
            .mock("POST", "/clio/contacts")
            .match_body(Matcher::PartialJson(json!({ "data": { "attributes": { "first_name": "B" } } })))
            .with_status(422)
            .with_body(r#"{"message": "last_name is required"}"#)
            .expect(1)
            .create_async()
            .await;

        let h = Harness::new(&server.url());
        let outcome = h.integration.sync(SyncDirection::GhlToClio, "contact", None).await;

        accepted.assert_async().await;
        refused.assert_async().await;
        assert!(outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("Synced 3 contacts from GHL to Clio"));

        let results = outcome.results.unwrap();
        let summary: Vec<_> = results.iter().map(|r| (r.source_id.clone(), r.success)).collect();
        assert_eq!(
            summary,
            vec![(Some("a".to_string()), true), (None, false), (Some("b".to_string()), false)]
        );
        assert!(results[1].result["error"].is_string());
        assert_eq!(results[2].result["message"], "last_name is required");

        let mut logged = h.store.error_types_logged();
        logged.sort();
        assert_eq!(logged, vec!["API Response Error".to_string(), "Data Mapping Error".to_string()]);
    }

    #[tokio::test]
    async fn single_clio_contact_syncs_to_ghl() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/clio/contacts/12")
            .with_status(200)
            .with_body(r#"{"data": {"id": 12, "first_name": "Alan", "last_name": "Turing"}}"#)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/ghl/contacts/")
            .match_body(Matcher::PartialJson(json!({ "firstName": "Alan", "lastName": "Turing" })))
            .with_status(200)
            .with_body(r#"{"contact": {"id": "g-12"}}"#)
            .create_async()
            .await;

        let h = Harness::new(&server.url());
        let outcome = h.integration.sync(SyncDirection::ClioToGhl, "contact", Some("12")).await;

        create.assert_async().await;
        assert!(outcome.success, "{:?}", outcome);
        assert_eq!(outcome.message.as_deref(), Some("Successfully synced contact from Clio to GHL"));
    }

    #[tokio::test]
    async fn unsupported_entity_is_a_sync_error() {
        let h = Harness::new("http://127.0.0.1:9");
        let outcome = h.integration.sync(SyncDirection::GhlToClio, "matter", None).await;

        assert_eq!(outcome.error.as_deref(), Some("Unsupported entity type: matter"));
        assert_eq!(h.store.error_types_logged(), vec!["Sync Error".to_string()]);
    }

    #[tokio::test]
    async fn test_connection_reports_upstream_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/clio/users/who_am_i")
            .with_status(403)
            .with_body(r#"{"message": "Forbidden"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/ghl/locations/")
            .with_status(200)
            .with_body(r#"{"locations": []}"#)
            .create_async()
            .await;

        let h = Harness::new(&server.url());
        let clio = h.integration.test_connection(Platform::Clio).await;
        assert_eq!(clio.error.as_deref(), Some("Connection to Clio failed: Forbidden"));

        let ghl = h.integration.test_connection(Platform::Ghl).await;
        assert_eq!(ghl.message.as_deref(), Some("Successfully connected to GHL"));
    }
}
