//! Insurance providers and coverage checks.

use crate::context::ToolContext;
use crate::handlers::{pretty, required_str, string_schema};
use crate::protocol::{ResourceDefinition, ToolDefinition};
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use serde_json::Value;
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_resource(
        ResourceDefinition {
            uri_template: "insurance://providers".to_string(),
            name: "insurance_providers".to_string(),
            description: Some("All accepted insurance providers.".to_string()),
        },
        wrap(ctx, providers),
    );
    registry.register_tool(
        ToolDefinition {
            name: "check_procedure_coverage".to_string(),
            description: Some("Checks insurance coverage for a specific procedure.".to_string()),
            input_schema: string_schema(&["procedure_id", "insurance_id"], &[]),
        },
        wrap(ctx, check_coverage),
    );
}

async fn providers(ctx: Arc<ToolContext>, _args: Value) -> ToolOutcome {
    let data = ctx
        .client
        .get("/clinics/insurance/providers", None)
        .await
        .map_err(|err| format!("Failed to fetch insurance providers: {err}"))?;
    Ok(pretty(&data))
}

async fn check_coverage(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let procedure_id = required_str(&args, "procedure_id")?;
    let insurance_id = required_str(&args, "insurance_id")?;

    let data = ctx
        .client
        .get(
            "/clinics/procedures/insurance-coverage",
            Some(&[("procedureId", procedure_id), ("insuranceId", insurance_id)]),
        )
        .await
        .map_err(|err| format!("Check failed: {err}"))?;

    Ok(format!("Coverage Details: {}", pretty(&data)))
}
