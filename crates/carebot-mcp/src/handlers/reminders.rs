//! Medication reminders and adherence.

use crate::context::ToolContext;
use crate::handlers::{field_text, optional_str, required_str, string_schema};
use crate::protocol::{ResourceDefinition, ToolDefinition};
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use serde_json::{Value, json};
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_resource(
        ResourceDefinition {
            uri_template: "reminders://medication/pending/{patient_name}".to_string(),
            name: "pending_medication_reminders".to_string(),
            description: Some("Pending medication reminders for a patient.".to_string()),
        },
        wrap(ctx, pending_reminders),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "reminders://adherence/{patient_name}".to_string(),
            name: "adherence_stats".to_string(),
            description: Some("Adherence rate and missed dose statistics.".to_string()),
        },
        wrap(ctx, adherence_stats),
    );
    registry.register_tool(
        ToolDefinition {
            name: "create_medication_reminder".to_string(),
            description: Some(
                "Sets up a recurring medication schedule. Example: 'Remind John Doe \
                 to take Metformin 500mg twice daily until 2026-01-01'."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "patient_name": {"type": "string"},
                    "medication": {"type": "string"},
                    "dosage": {"type": "string"},
                    "frequency": {"type": "string"},
                    "times": {"type": "array", "items": {"type": "string"}},
                    "end_date": {"type": "string"}
                },
                "required": ["patient_name", "medication", "dosage", "frequency", "times", "end_date"]
            }),
        },
        wrap(ctx, create_reminder),
    );
    registry.register_tool(
        ToolDefinition {
            name: "log_medication_taken".to_string(),
            description: Some("Records that a patient successfully took their dose.".to_string()),
            input_schema: string_schema(&["reminder_id"], &["notes"]),
        },
        wrap(ctx, log_taken),
    );
}

async fn pending_reminders(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let Some(patient_id) = ctx.directory.resolve_patient_id(patient_name).await else {
        return Err(format!("Error: Patient '{patient_name}' not found."));
    };

    let raw = ctx
        .client
        .get(&format!("/db/reminders/medication/{patient_id}"), None)
        .await
        .map_err(|err| format!("Failed to fetch reminders: {err}"))?;

    let reminders = raw.as_array().cloned().unwrap_or_default();
    if reminders.is_empty() {
        return Ok(format!("No pending medication reminders for {patient_name}."));
    }

    let lines: Vec<String> = reminders
        .iter()
        .map(|r| {
            format!(
                "• {} | Scheduled: {}",
                field_text(&r["message"]),
                field_text(&r["send_at"])
            )
        })
        .collect();
    Ok(format!(
        "Pending Medication for {patient_name}:\n{}",
        lines.join("\n")
    ))
}

async fn adherence_stats(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let Some(patient_id) = ctx.directory.resolve_patient_id(patient_name).await else {
        return Err(format!("Error: Patient '{patient_name}' not found."));
    };

    let stats = ctx
        .client
        .get(&format!("/db/reminders/adherence/{patient_id}"), None)
        .await
        .map_err(|err| format!("Failed to fetch adherence stats: {err}"))?;

    Ok(format!(
        "Adherence Report for {patient_name}:\nRate: {}%\nTaken: {} | Missed: {}\nTotal Reminders: {}",
        field_text(&stats["adherence_rate"]),
        field_text(&stats["taken"]),
        field_text(&stats["missed"]),
        field_text(&stats["total_reminders"]),
    ))
}

async fn create_reminder(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let medication = required_str(&args, "medication")?;
    let dosage = required_str(&args, "dosage")?;
    let frequency = required_str(&args, "frequency")?;
    let times = args
        .get("times")
        .filter(|v| v.is_array())
        .cloned()
        .ok_or_else(|| "Missing required parameter 'times'.".to_string())?;
    let end_date = required_str(&args, "end_date")?;

    let Some(patient_id) = ctx.directory.resolve_patient_id(patient_name).await else {
        return Err(format!("Error: Patient '{patient_name}' not found."));
    };

    let payload = json!({
        "userId": patient_id,
        "medicationName": medication,
        "dosage": dosage,
        "frequency": frequency,
        "timingContext": "standard",
        "scheduledTimes": times,
        "endDate": end_date
    });

    let response = ctx
        .client
        .post("/db/reminders/medication", &payload)
        .await
        .map_err(|err| format!("Failed to create medication schedule: {err}"))?;

    let message = response
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Reminder schedule");
    Ok(format!("{message} created for {patient_name}."))
}

async fn log_taken(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let reminder_id = required_str(&args, "reminder_id")?;
    let notes = optional_str(&args, "notes").unwrap_or("");

    ctx.client
        .patch(
            &format!("/db/reminders/adherence/{reminder_id}"),
            &json!({"taken": true, "notes": notes}),
        )
        .await
        .map_err(|err| format!("Logging failed: {err}"))?;

    Ok(format!("Dose logged for reminder {reminder_id}."))
}
