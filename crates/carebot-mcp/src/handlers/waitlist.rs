//! Appointment waitlist.

use crate::context::ToolContext;
use crate::handlers::{optional_str, pretty, required_str, string_schema};
use crate::protocol::{ResourceDefinition, ToolDefinition};
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use serde_json::{Value, json};
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_tool(
        ToolDefinition {
            name: "join_waitlist".to_string(),
            description: Some("Adds a patient to the appointment waitlist.".to_string()),
            input_schema: string_schema(&["clinic_id", "patient_id", "preferred_date"], &["notes"]),
        },
        wrap(ctx, join_waitlist),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "waitlist://all".to_string(),
            name: "active_waitlist".to_string(),
            description: Some("The active appointment waitlist.".to_string()),
        },
        wrap(ctx, view_waitlist),
    );
}

async fn join_waitlist(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let clinic_id = required_str(&args, "clinic_id")?;
    let patient_id = required_str(&args, "patient_id")?;
    let preferred_date = required_str(&args, "preferred_date")?;
    let notes = optional_str(&args, "notes").unwrap_or("");

    let payload = json!({
        "clinic_id": clinic_id,
        "patient_id": patient_id,
        "preferred_date": preferred_date,
        "notes": notes,
        "status": "active"
    });

    let response = ctx
        .client
        .post("/db/waitlist/add", &payload)
        .await
        .map_err(|err| format!("Failed to join waitlist: {err}"))?;

    let id = response.get("id").and_then(Value::as_str).unwrap_or("unknown");
    Ok(format!("Added to waitlist. ID: {id}"))
}

async fn view_waitlist(ctx: Arc<ToolContext>, _args: Value) -> ToolOutcome {
    let data = ctx
        .client
        .get("/db/waitlist", None)
        .await
        .map_err(|err| format!("Failed to fetch the waitlist: {err}"))?;
    Ok(pretty(&data))
}
