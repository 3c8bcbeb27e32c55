//! Pre-visit questionnaires.

use crate::context::ToolContext;
use crate::handlers::{optional_str, pretty, required_str};
use crate::protocol::{ResourceDefinition, ToolDefinition};
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use serde_json::{Value, json};
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_resource(
        ResourceDefinition {
            uri_template: "previsit://all".to_string(),
            name: "all_previsit_responses".to_string(),
            description: Some("All submitted pre-visit questionnaires.".to_string()),
        },
        wrap(ctx, all_responses),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "previsit://date-range/{start_date}/{end_date}".to_string(),
            name: "previsit_by_date".to_string(),
            description: Some("Questionnaires submitted within a date range.".to_string()),
        },
        wrap(ctx, responses_by_date),
    );
    registry.register_tool(
        ToolDefinition {
            name: "submit_previsit_response".to_string(),
            description: Some(
                "Submits a pre-visit questionnaire for a patient's latest appointment.".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "patient_name": {"type": "string"},
                    "responses": {"type": "object"},
                    "notes": {"type": "string"}
                },
                "required": ["patient_name", "responses"]
            }),
        },
        wrap(ctx, submit_response),
    );
}

async fn all_responses(ctx: Arc<ToolContext>, _args: Value) -> ToolOutcome {
    let data = ctx
        .client
        .get("/previsit-responses", None)
        .await
        .map_err(|err| format!("Failed to fetch pre-visit responses: {err}"))?;
    let total = data.as_array().map_or(0, Vec::len);
    Ok(format!("Total Responses: {total}\n{}", pretty(&data)))
}

async fn responses_by_date(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let start_date = required_str(&args, "start_date")?;
    let end_date = required_str(&args, "end_date")?;

    let data = ctx
        .client
        .get(
            "/previsit-responses/date-range",
            Some(&[("startDate", start_date), ("endDate", end_date)]),
        )
        .await
        .map_err(|err| format!("Failed to fetch pre-visit responses: {err}"))?;
    Ok(format!(
        "Responses ({start_date} to {end_date}):\n{}",
        pretty(&data)
    ))
}

async fn submit_response(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let responses = args
        .get("responses")
        .filter(|v| v.is_object())
        .cloned()
        .ok_or_else(|| "Missing required parameter 'responses'.".to_string())?;
    let notes = optional_str(&args, "notes").unwrap_or("");

    let Some(patient_id) = ctx.directory.resolve_patient_id(patient_name).await else {
        return Err(format!("Error: Patient '{patient_name}' not found."));
    };
    let Some(appointment_id) = ctx.directory.last_appointment_id(&patient_id).await else {
        return Err(format!(
            "Error: No recent appointment found for {patient_name} to attach responses to."
        ));
    };

    let payload = json!({
        "appointment_id": appointment_id,
        "responses": responses,
        "notes": notes,
        "is_complete": true
    });

    ctx.client
        .post("/previsit-responses", &payload)
        .await
        .map_err(|err| format!("Submission failed: {err}"))?;

    Ok(format!("Pre-visit forms submitted for {patient_name}."))
}
