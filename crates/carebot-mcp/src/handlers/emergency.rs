//! Emergency reporting and status tracking.

use crate::context::ToolContext;
use crate::handlers::{optional_str, pretty, required_str, string_schema};
use crate::protocol::{ResourceDefinition, ToolDefinition};
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use serde_json::{Value, json};
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_tool(
        ToolDefinition {
            name: "report_emergency".to_string(),
            description: Some(
                "Reports a medical emergency to the dashboard. Priority options: \
                 'routine', 'urgent', 'critical'."
                    .to_string(),
            ),
            input_schema: string_schema(&["clinic_id", "patient_id", "description"], &["priority"]),
        },
        wrap(ctx, report_emergency),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "emergency://all".to_string(),
            name: "all_emergencies".to_string(),
            description: Some("All active emergencies.".to_string()),
        },
        wrap(ctx, all_emergencies),
    );
    registry.register_tool(
        ToolDefinition {
            name: "update_emergency_status".to_string(),
            description: Some("Updates emergency status (e.g. 'resolved').".to_string()),
            input_schema: string_schema(&["emergency_id", "status"], &["notes"]),
        },
        wrap(ctx, update_status),
    );
}

async fn report_emergency(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let clinic_id = required_str(&args, "clinic_id")?;
    let patient_id = required_str(&args, "patient_id")?;
    let description = required_str(&args, "description")?;
    let priority = optional_str(&args, "priority").unwrap_or("routine");

    let payload = json!({
        "clinicId": clinic_id,
        "patientId": patient_id,
        "description": description,
        "priority": priority,
        "status": "reported"
    });

    let response = ctx
        .client
        .post("/emergencies", &payload)
        .await
        .map_err(|err| format!("Failed to report emergency: {err}"))?;

    let id = response.get("id").and_then(Value::as_str).unwrap_or("unknown");
    Ok(format!("Emergency reported. ID: {id}"))
}

async fn all_emergencies(ctx: Arc<ToolContext>, _args: Value) -> ToolOutcome {
    let data = ctx
        .client
        .get("/emergencies", None)
        .await
        .map_err(|err| format!("Failed to fetch emergencies: {err}"))?;
    Ok(pretty(&data))
}

async fn update_status(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let emergency_id = required_str(&args, "emergency_id")?;
    let status = required_str(&args, "status")?;

    let mut payload = serde_json::Map::new();
    payload.insert("status".to_string(), json!(status));
    if let Some(notes) = optional_str(&args, "notes") {
        payload.insert("notes".to_string(), json!(notes));
    }

    ctx.client
        .put(
            &format!("/emergencies/{emergency_id}/status"),
            &Value::Object(payload),
        )
        .await
        .map_err(|err| format!("Update failed: {err}"))?;

    Ok(format!("Status updated to {status}."))
}
