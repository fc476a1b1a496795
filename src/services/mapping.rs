//! Contact mapping between the GHL and Clio data models

use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::database::models::{DataMapping, MappingType};

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Failed to map {0} contact: expected a JSON object")]
    NotAnObject(&'static str),
}

/// GHL contact to a Clio `contacts` create/update envelope.
///
/// Stored mappings run first; the fixed name/email/phone rules are applied
/// last so they always win for those attributes.
pub fn ghl_to_clio_contact(ghl: &Value, mappings: &[DataMapping]) -> Result<Value, MappingError> {
    let contact = ghl.as_object().ok_or(MappingError::NotAnObject("GHL"))?;
    let mut attributes = Map::new();

    for mapping in mappings.iter().filter(|m| m.is_active) {
        let Some(value) = contact.get(&mapping.ghl_field).filter(|v| !v.is_null()) else {
            continue;
        };
        match mapping.kind() {
            Some(MappingType::Direct) => {
                attributes.insert(mapping.clio_field.clone(), value.clone());
            }
            Some(MappingType::Transform) => {
                if let Some(v) = transform(value, mapping.transform_logic.as_deref()) {
                    attributes.insert(mapping.clio_field.clone(), v);
                }
            }
            Some(MappingType::Custom) | None => {}
        }
    }

    if let Some(first) = contact.get("firstName") {
        attributes.insert("first_name".into(), first.clone());
    }
    if let Some(last) = contact.get("lastName") {
        attributes.insert("last_name".into(), last.clone());
    }
    if let Some(email) = non_empty_str(contact.get("email")) {
        attributes.insert("emails".into(), json!([{ "name": "Primary", "address": email }]));
    }
    if let Some(phone) = non_empty_str(contact.get("phone")) {
        attributes.insert("phone_numbers".into(), json!([{ "name": "Primary", "number": phone }]));
    }

    Ok(json!({ "data": { "type": "contacts", "attributes": attributes } }))
}

/// Clio contact (envelope, resource or bare attributes) to a GHL contact body
pub fn clio_to_ghl_contact(clio: &Value) -> Result<Value, MappingError> {
    let mut node = clio.as_object().ok_or(MappingError::NotAnObject("Clio"))?;
    if let Some(data) = node.get("data").and_then(Value::as_object) {
        node = data;
    }
    if let Some(attrs) = node.get("attributes").and_then(Value::as_object) {
        node = attrs;
    }

    let text = |key: &str| node.get(key).and_then(Value::as_str).unwrap_or("").to_string();
    let mut ghl = Map::new();
    ghl.insert("firstName".into(), Value::String(text("first_name")));
    ghl.insert("lastName".into(), Value::String(text("last_name")));

    if let Some(email) = first_entry(node, "emails").and_then(|e| e.get("address")) {
        ghl.insert("email".into(), email.clone());
    }
    if let Some(number) = first_entry(node, "phone_numbers").and_then(|p| p.get("number")) {
        ghl.insert("phone".into(), number.clone());
    }
    if let Some(address) = first_entry(node, "addresses") {
        let field = |key: &str| Value::String(address.get(key).and_then(Value::as_str).unwrap_or("").to_string());
        ghl.insert("address1".into(), field("street"));
        ghl.insert("city".into(), field("city"));
        ghl.insert("state".into(), field("province"));
        ghl.insert("postalCode".into(), field("postal_code"));
        ghl.insert("country".into(), field("country"));
    }
    ghl.insert("companyName".into(), company_name(node.get("company")));

    Ok(Value::Object(ghl))
}

/// Email of a mapped contact in either direction, used for upsert matching
pub fn contact_email(mapped: &Value) -> Option<String> {
    let from_ghl = mapped.get("email").and_then(Value::as_str);
    let from_clio = mapped
        .pointer("/data/attributes/emails/0/address")
        .and_then(Value::as_str);
    from_ghl.or(from_clio).filter(|e| !e.is_empty()).map(str::to_string)
}

fn transform(value: &Value, logic: Option<&str>) -> Option<Value> {
    let Some(s) = value.as_str() else {
        return Some(value.clone());
    };
    let out = match logic.map(str::trim).unwrap_or("") {
        "lowercase" => s.to_lowercase(),
        "uppercase" => s.to_uppercase(),
        "trim" => s.trim().to_string(),
        "title" => super::intake::title_case(s),
        "digits" => s.chars().filter(char::is_ascii_digit).collect(),
        other => {
            warn!("Unknown transform '{}', field skipped", other);
            return None;
        }
    };
    Some(Value::String(out))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn first_entry<'a>(node: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    node.get(key).and_then(Value::as_array).and_then(|a| a.first())
}

/// Clio returns `company` either as a name or as `{ "name": ... }`
fn company_name(company: Option<&Value>) -> Value {
    match company {
        Some(Value::String(name)) => Value::String(name.clone()),
        Some(Value::Object(obj)) => obj.get("name").cloned().unwrap_or_else(|| Value::String(String::new())),
        _ => Value::String(String::new()),
    }
}
