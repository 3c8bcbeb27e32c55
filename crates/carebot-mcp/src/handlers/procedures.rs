//! Procedure guidelines and search.

use crate::context::ToolContext;
use crate::handlers::{pretty, required_str, string_schema};
use crate::protocol::ToolDefinition;
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use serde_json::Value;
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_tool(
        ToolDefinition {
            name: "get_procedure_guidelines".to_string(),
            description: Some("Pre/post-visit guidelines for a procedure by name.".to_string()),
            input_schema: string_schema(&["procedure_name"], &[]),
        },
        wrap(ctx, procedure_guidelines),
    );
    registry.register_tool(
        ToolDefinition {
            name: "search_procedures".to_string(),
            description: Some("Search for a procedure ID by name.".to_string()),
            input_schema: string_schema(&["name"], &[]),
        },
        wrap(ctx, search_procedures),
    );
}

async fn procedure_guidelines(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let procedure_name = required_str(&args, "procedure_name")?;
    match ctx
        .client
        .get(&format!("/procedure-guidelines/procedure/{procedure_name}"), None)
        .await
    {
        Ok(data) => Ok(format!("Guidelines for {procedure_name}:\n{}", pretty(&data))),
        // Missing guidelines are an ordinary outcome, not a failure.
        Err(_) => Ok(format!("No guidelines found for '{procedure_name}'.")),
    }
}

async fn search_procedures(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let name = required_str(&args, "name")?;
    let data = ctx
        .client
        .get(&format!("/procedures/name/{name}"), None)
        .await
        .map_err(|err| format!("Search failed: {err}"))?;
    Ok(pretty(&data))
}
