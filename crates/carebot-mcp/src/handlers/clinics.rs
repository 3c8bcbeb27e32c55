//! Clinic network listings.

use crate::context::ToolContext;
use crate::handlers::required_str;
use crate::protocol::ResourceDefinition;
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use carebot_core::Clinic;
use serde_json::Value;
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_resource(
        ResourceDefinition {
            uri_template: "clinics://all".to_string(),
            name: "all_clinics".to_string(),
            description: Some("All clinics in the network.".to_string()),
        },
        wrap(ctx, all_clinics),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "clinics://details/{clinic_id}".to_string(),
            name: "clinic_details".to_string(),
            description: Some("Details for a specific clinic.".to_string()),
        },
        wrap(ctx, clinic_details),
    );
}

async fn all_clinics(ctx: Arc<ToolContext>, _args: Value) -> ToolOutcome {
    // Near-static data, served from the long-TTL clinic cache.
    let clinics = ctx
        .directory
        .clinics()
        .await
        .map_err(|err| format!("Failed to fetch clinics: {err}"))?;

    let lines: Vec<String> = clinics
        .iter()
        .map(|c| {
            format!(
                "• {} ({}) - {}",
                c.name,
                c.city.as_deref().unwrap_or("n/a"),
                c.phone.as_deref().unwrap_or("n/a")
            )
        })
        .collect();
    Ok(format!("Available Clinics:\n{}", lines.join("\n")))
}

async fn clinic_details(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let clinic_id = required_str(&args, "clinic_id")?;
    let raw = ctx
        .client
        .get(&format!("/clinics/{clinic_id}"), None)
        .await
        .map_err(|err| format!("Failed to fetch clinic details: {err}"))?;
    let clinic: Clinic =
        serde_json::from_value(raw).map_err(|err| format!("Unexpected clinic payload: {err}"))?;

    Ok(format!(
        "Clinic: {}\nAddress: {}, {}\nContact: {} | {}",
        clinic.name,
        clinic.address.as_deref().unwrap_or("n/a"),
        clinic.city.as_deref().unwrap_or("n/a"),
        clinic.phone.as_deref().unwrap_or("n/a"),
        clinic.email.as_deref().unwrap_or("n/a"),
    ))
}
