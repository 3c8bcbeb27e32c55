//! Tool and resource handler families.
//!
//! Each module mirrors one family of the DBOps surface and exposes a
//! `register` function that wires its handlers into the registry. Handlers
//! are thin: resolve identifiers where needed, call the backend, format the
//! response as text. Every failure (missing parameter, unresolved name,
//! backend rejection) becomes a descriptive message, never a raw error.

pub mod appointments;
pub mod clinical;
pub mod clinics;
pub mod communication;
pub mod doctors;
pub mod emergency;
pub mod inquiries;
pub mod insurance;
pub mod medications;
pub mod patients;
pub mod previsit;
pub mod procedures;
pub mod reminders;
pub mod revenue;
pub mod search;
pub mod users;
pub mod waitlist;

use serde_json::{Value, json};

/// Extract a required string argument, with a user-facing message on miss.
pub(crate) fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| format!("Missing required parameter '{key}'."))
}

/// Extract an optional string argument; empty strings count as absent.
pub(crate) fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Render a JSON field for line-oriented output: strings bare, everything
/// else in its JSON form.
pub(crate) fn field_text(value: &Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

/// Pretty-print a backend payload that is passed through untransformed.
pub(crate) fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Build a flat object schema where every property is a string and the
/// listed `required` keys are mandatory.
pub(crate) fn string_schema(required: &[&str], optional: &[&str]) -> Value {
    let mut properties = serde_json::Map::new();
    for key in required.iter().chain(optional) {
        properties.insert((*key).to_string(), json!({"type": "string"}));
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
