//! Communication log pass-through.

use crate::context::ToolContext;
use crate::handlers::{optional_str, required_str, string_schema};
use crate::protocol::ToolDefinition;
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use serde_json::{Value, json};
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_tool(
        ToolDefinition {
            name: "add_communication_logs".to_string(),
            description: Some("Logs a chat message to the clinic dashboard.".to_string()),
            input_schema: string_schema(
                &["patient_id", "message"],
                &["channel", "direction", "message_type", "intent", "user_id", "doctor_id"],
            ),
        },
        wrap(ctx, add_log),
    );
}

async fn add_log(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_id = required_str(&args, "patient_id")?;
    let message = required_str(&args, "message")?;
    let channel = optional_str(&args, "channel").unwrap_or("whatsapp");
    let direction = optional_str(&args, "direction").unwrap_or("outbound");
    let message_type = optional_str(&args, "message_type").unwrap_or("text");

    let payload = json!({
        "patient_id": patient_id,
        "user_id": optional_str(&args, "user_id"),
        "doctor_id": optional_str(&args, "doctor_id"),
        "message": message,
        "message_type": message_type,
        "channel": channel,
        "direction": direction,
        "intent": optional_str(&args, "intent"),
    });

    match ctx.client.post("/communication-logs", &payload).await {
        Ok(_) => Ok("Logged to dashboard.".to_string()),
        // A missing logging endpoint must not fail the surrounding action.
        Err(err) if err.is_not_found() => {
            tracing::warn!("communication-logs endpoint missing; log skipped");
            let preview: String = message.chars().take(20).collect();
            Ok(format!(
                "Log skipped (backend endpoint missing), but action continued. Message: {preview}..."
            ))
        }
        Err(err) => Err(format!("Logging failed: {err}")),
    }
}
