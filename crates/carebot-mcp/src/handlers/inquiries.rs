//! Patient inquiries (support tickets).

use crate::context::ToolContext;
use crate::handlers::{optional_str, pretty, required_str, string_schema};
use crate::protocol::{ResourceDefinition, ToolDefinition};
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use serde_json::{Value, json};
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_tool(
        ToolDefinition {
            name: "create_medical_inquiry".to_string(),
            description: Some("Creates a support ticket/inquiry for a patient.".to_string()),
            input_schema: string_schema(&["patient_id", "subject", "message"], &["type"]),
        },
        wrap(ctx, create_inquiry),
    );
    registry.register_tool(
        ToolDefinition {
            name: "mark_inquiry_answered".to_string(),
            description: Some("Marks an inquiry as answered.".to_string()),
            input_schema: string_schema(&["inquiry_id", "answer_text", "user_id"], &[]),
        },
        wrap(ctx, mark_answered),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "inquiries://list".to_string(),
            name: "all_inquiries".to_string(),
            description: Some("All patient inquiries.".to_string()),
        },
        wrap(ctx, list_inquiries),
    );
}

async fn create_inquiry(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_id = required_str(&args, "patient_id")?;
    let subject = required_str(&args, "subject")?;
    let message = required_str(&args, "message")?;
    let inquiry_type = optional_str(&args, "type").unwrap_or("medical");

    let payload = json!({
        "patientId": patient_id,
        "subject": subject,
        "message": message,
        "type": inquiry_type
    });

    let response = ctx
        .client
        .post("/inquiries", &payload)
        .await
        .map_err(|err| format!("Creation failed: {err}"))?;

    let id = response.get("id").and_then(Value::as_str).unwrap_or("unknown");
    Ok(format!("Inquiry created. ID: {id}"))
}

async fn mark_answered(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let inquiry_id = required_str(&args, "inquiry_id")?;
    let answer_text = required_str(&args, "answer_text")?;
    let user_id = required_str(&args, "user_id")?;

    ctx.client
        .patch(
            &format!("/inquiries/{inquiry_id}/answer"),
            &json!({"answerText": answer_text, "answeredByUserId": user_id}),
        )
        .await
        .map_err(|err| format!("Update failed: {err}"))?;

    Ok("Inquiry marked as answered.".to_string())
}

async fn list_inquiries(ctx: Arc<ToolContext>, _args: Value) -> ToolOutcome {
    let data = ctx
        .client
        .get("/inquiries", None)
        .await
        .map_err(|err| format!("Failed to fetch inquiries: {err}"))?;
    Ok(pretty(&data))
}
