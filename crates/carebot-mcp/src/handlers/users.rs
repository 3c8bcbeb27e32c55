//! User account registration.

use crate::context::ToolContext;
use crate::handlers::{required_str, string_schema};
use crate::protocol::ToolDefinition;
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use serde_json::{Value, json};
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_tool(
        ToolDefinition {
            name: "register_user".to_string(),
            description: Some("Registers a new user account.".to_string()),
            input_schema: string_schema(&["email", "full_name", "phone"], &[]),
        },
        wrap(ctx, register_user),
    );
}

/// Username falls back to the email local part, then to the snake_cased name.
fn derive_username(email: &str, full_name: &str) -> String {
    match email.split_once('@') {
        Some((local, _)) => local.to_string(),
        None => full_name.replace(' ', "_").to_lowercase(),
    }
}

async fn register_user(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let email = required_str(&args, "email")?;
    let full_name = required_str(&args, "full_name")?;
    let phone = required_str(&args, "phone")?;

    let payload = json!({
        "email": email,
        "fullName": full_name,
        "phoneNumber": phone,
        "roleId": "patient",
        "username": derive_username(email, full_name),
        "languagePreference": "en"
    });

    let response = ctx
        .client
        .post("/auth/register", &payload)
        .await
        .map_err(|err| format!("Registration failed: {err}"))?;

    let id = response.get("id").and_then(Value::as_str).unwrap_or("unknown");
    Ok(format!("User registered. ID: {id}"))
}
