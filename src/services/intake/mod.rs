//! Voice-AI call intake: a GHL call webhook becomes a Clio contact and matter.

pub mod practice_area;
pub mod summary;
pub mod transcript;

pub use practice_area::extract_practice_area;
pub use summary::{summarize_transcript, FALLBACK_SUMMARY};
pub use transcript::{extract_caller_info, should_create_matter, CallerInfo};
pub(crate) use transcript::title_case;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::audit::AuditTrail;
use crate::clients::{ClientError, ClioClient, PlatformResponse};

const MATTER_DESCRIPTION_LIMIT: usize = 255;
const MATTER_SUMMARY_LENGTH: usize = 240;
const DEFAULT_MATTER_DESCRIPTION: &str = "Lead from GoHighLevel";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Not authenticated with Clio")]
    NotAuthenticated { auth_url: Option<String> },

    #[error("Failed to create contact in Clio: {0}")]
    ContactCreation(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Caller and case details resolved from a call webhook
#[derive(Debug, Clone, Default, Serialize)]
pub struct CallIntake {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub state: String,
    pub case_description: String,
    pub practice_area: &'static str,
}

impl CallIntake {
    /// Transcript details win; webhook fields and then `customData` fill the gaps
    pub fn from_payload(payload: &Value) -> Self {
        let transcript = transcript_of(payload);
        let caller = extract_caller_info(&transcript);
        let custom = payload.get("customData").filter(|c| c.is_object());

        let field = |source: Option<&Value>, key: &str| -> String {
            source
                .and_then(|s| s.get(key))
                .and_then(Value::as_str)
                .unwrap_or("")
                .trim()
                .to_string()
        };
        let pick = |extracted: String, key: &str| -> String {
            [extracted, field(Some(payload), key), field(custom, key)]
                .into_iter()
                .find(|v| !v.is_empty())
                .unwrap_or_default()
        };

        let full_name = title_case(&pick(caller.name, "full_name"));
        let case_description = match field(custom, "case_description") {
            d if !d.is_empty() => d,
            _ => transcript,
        };

        Self {
            full_name,
            email: pick(caller.email, "email"),
            phone: pick(caller.phone, "phone"),
            state: field(Some(payload), "state"),
            practice_area: extract_practice_area(&case_description),
            case_description,
        }
    }
}

/// `transcription` at the top level or under `customData`
pub fn transcript_of(payload: &Value) -> String {
    payload
        .get("transcription")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .or_else(|| payload.pointer("/customData/transcription").and_then(Value::as_str))
        .unwrap_or("")
        .to_string()
}

#[derive(Debug, Clone)]
pub enum IntakeOutcome {
    /// The AI agent declined the case; nothing was created
    Rejected,
    Forwarded {
        contact: Value,
        matter: Value,
        practice_area: &'static str,
    },
}

#[derive(Clone)]
pub struct IntakeService {
    clio: ClioClient,
    audit: AuditTrail,
}

impl IntakeService {
    pub fn new(clio: ClioClient, audit: AuditTrail) -> Self {
        Self { clio, audit }
    }

    pub async fn process(&self, payload: &Value) -> Result<IntakeOutcome, IntakeError> {
        let transcript = transcript_of(payload);
        if !should_create_matter(&transcript) {
            info!("Call rejected by AI agent, no matter created");
            return Ok(IntakeOutcome::Rejected);
        }

        let intake = CallIntake::from_payload(payload);
        info!(
            "Call intake for '{}' classified as {}",
            intake.full_name, intake.practice_area
        );

        if !self.clio.has_access_token().await {
            return Err(IntakeError::NotAuthenticated {
                auth_url: self.clio.oauth().authorize_url().ok(),
            });
        }

        let created = self.create_contact(&intake).await.and_then(|contact| {
            let contact_id = contact_id_of(&contact)
                .ok_or_else(|| IntakeError::ContactCreation("response did not include a contact id".into()))?;
            Ok((contact, contact_id))
        });
        let (contact, contact_id) = match created {
            Ok(created) => created,
            Err(IntakeError::ContactCreation(message)) => {
                return Ok(self.contact_failed(&intake, &message).await);
            }
            Err(e) => return Err(e),
        };

        let matter = self.create_matter(&contact_id, &intake).await;

        Ok(IntakeOutcome::Forwarded {
            contact,
            matter,
            practice_area: intake.practice_area,
        })
    }

    /// Clio refused the contact: the call is still acknowledged, with no contact
    /// and a matter error in place of the matter
    async fn contact_failed(&self, intake: &CallIntake, message: &str) -> IntakeOutcome {
        let error = format!("Cannot create matter without valid contact ID: {}", message);
        warn!("{}", error);
        self.audit
            .error(
                None,
                "Contact Creation Error",
                format!("Failed to create contact in Clio: {}", message),
                Some(json!({ "full_name": intake.full_name, "practice_area": intake.practice_area })),
            )
            .await;
        IntakeOutcome::Forwarded {
            contact: Value::Null,
            matter: json!({ "error": error }),
            practice_area: intake.practice_area,
        }
    }

    async fn create_contact(&self, intake: &CallIntake) -> Result<Value, IntakeError> {
        let (first_name, last_name) = split_name(&intake.full_name);
        let mut data = json!({
            "type": "Person",
            "first_name": first_name,
            "last_name": last_name,
        });
        if !intake.phone.is_empty() {
            data["phone_numbers"] = json!([{ "number": intake.phone, "type": "work" }]);
        }
        if !intake.email.is_empty() {
            data["email_addresses"] = json!([{ "address": intake.email, "type": "work" }]);
        }
        if !intake.state.is_empty() {
            data["addresses"] = json!([{ "type": "home", "state": intake.state, "country": "US" }]);
        }

        let resp = self.clio.create_contact(&json!({ "data": data })).await?;
        if resp.success {
            return Ok(resp.data);
        }

        if resp.status_code == Some(422) && mentions_name(&resp) {
            warn!("Clio rejected contact fields, retrying with name and phone only");
            let mut minimal = json!({
                "type": "Person",
                "first_name": first_name,
                "last_name": last_name,
            });
            if !intake.phone.is_empty() {
                minimal["phone_numbers"] = json!([{ "number": intake.phone, "type": "work" }]);
            }
            let retry = self.clio.create_contact(&json!({ "data": minimal })).await?;
            if retry.success {
                return Ok(retry.data);
            }
            return Err(IntakeError::ContactCreation(retry.message()));
        }

        Err(IntakeError::ContactCreation(resp.message()))
    }

    /// Try the known matter payload shapes in turn; the result is the created
    /// matter or an error object describing why none succeeded.
    async fn create_matter(&self, contact_id: &str, intake: &CallIntake) -> Value {
        let description = matter_description(&intake.case_description);
        let base = json!({
            "type": "Matter",
            "display_number": format!("GHL-{}", contact_id),
            "description": description,
            "status": "Pending",
            "practice_area": intake.practice_area,
        });

        let mut with_client = base.clone();
        with_client["client"] = json!({ "id": contact_id });
        let mut with_client_id = base.clone();
        with_client_id["client_id"] = json!(contact_id);

        let attempts = [
            ("client", json!({ "data": with_client })),
            ("client_id", json!({ "data": with_client_id })),
            ("contact endpoint", json!({ "data": base })),
        ];

        for (i, (shape, body)) in attempts.iter().enumerate() {
            let result: Result<PlatformResponse, ClientError> = if i < 2 {
                self.clio.create_matter(body).await
            } else {
                self.clio.create_matter_for_contact(contact_id, body).await
            };

            match result {
                Ok(resp) if resp.success => {
                    info!("Created Clio matter for contact {} ({} shape)", contact_id, shape);
                    return resp.data;
                }
                Ok(resp) if resp.status_code == Some(401) => {
                    return json!({
                        "error": "Authentication failed - please re-authenticate with Clio",
                        "status_code": 401,
                    });
                }
                Ok(resp) => warn!("Matter creation ({} shape) failed: {}", shape, resp.message()),
                Err(e) => warn!("Matter creation ({} shape) failed: {}", shape, e),
            }
        }

        let failure = json!({
            "error": "Failed to create matter with all attempted formats",
            "contact_id": contact_id,
            "practice_area": intake.practice_area,
            "description_length": description.chars().count(),
            "message": "Check Clio authentication and API permissions",
        });
        self.audit
            .error(None, "Matter Creation Error", "Failed to create matter with all attempted formats", Some(failure.clone()))
            .await;
        failure
    }
}

fn contact_id_of(contact: &Value) -> Option<String> {
    contact
        .pointer("/data/id")
        .or_else(|| contact.get("id"))
        .and_then(|id| match id {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// First word is the first name; Clio needs a last name, so a lone name gets "."
pub fn split_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    match parts.next() {
        None => ("Unknown".to_string(), "Caller".to_string()),
        Some(first) => {
            let rest: Vec<&str> = parts.collect();
            let last = if rest.is_empty() { ".".to_string() } else { rest.join(" ") };
            (first.to_string(), last)
        }
    }
}

fn matter_description(case_description: &str) -> String {
    let description = if case_description.chars().count() > MATTER_DESCRIPTION_LIMIT {
        summarize_transcript(case_description, MATTER_SUMMARY_LENGTH)
    } else {
        case_description.to_string()
    };
    if description.trim().is_empty() {
        DEFAULT_MATTER_DESCRIPTION.to_string()
    } else {
        description
    }
}

fn mentions_name(resp: &PlatformResponse) -> bool {
    let text = resp.data.to_string().to_lowercase();
    text.contains("name") || text.contains("first")
}
