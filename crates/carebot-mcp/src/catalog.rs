//! Startup assembly of the capability table.

use crate::context::ToolContext;
use crate::handlers;
use crate::registry::CapabilityRegistry;
use std::sync::Arc;

/// Build the full capability registry over a shared context.
///
/// This is the single place where handlers are wired up: one call per
/// family, executed once at process start. Nothing registers itself as an
/// import-time side effect.
pub fn build_registry(ctx: &Arc<ToolContext>) -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();

    handlers::doctors::register(&mut registry, ctx);
    handlers::patients::register(&mut registry, ctx);
    handlers::appointments::register(&mut registry, ctx);
    handlers::clinical::register(&mut registry, ctx);
    handlers::medications::register(&mut registry, ctx);
    handlers::previsit::register(&mut registry, ctx);
    handlers::reminders::register(&mut registry, ctx);
    handlers::revenue::register(&mut registry, ctx);
    handlers::clinics::register(&mut registry, ctx);
    handlers::communication::register(&mut registry, ctx);
    handlers::emergency::register(&mut registry, ctx);
    handlers::inquiries::register(&mut registry, ctx);
    handlers::insurance::register(&mut registry, ctx);
    handlers::waitlist::register(&mut registry, ctx);
    handlers::users::register(&mut registry, ctx);
    handlers::procedures::register(&mut registry, ctx);
    handlers::search::register(&mut registry, ctx);

    tracing::info!(
        tools = registry.tool_count(),
        resources = registry.resource_count(),
        "capability registry assembled"
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebot_core::CacheConfig;
    use carebot_dbops::DbOpsClient;

    fn dummy_context() -> Arc<ToolContext> {
        let client = Arc::new(
            DbOpsClient::new("http://localhost:0", Some("t".to_string())).unwrap(),
        );
        Arc::new(ToolContext::new(client, &CacheConfig::default()))
    }

    #[test]
    fn catalog_registers_the_full_surface() {
        let registry = build_registry(&dummy_context());

        for tool in [
            "get_doctors",
            "add_availability_tool",
            "search_staff_tools",
            "resolve_patient_by_phone",
            "create_patient_tool",
            "book_appointment",
            "cancel_appointment",
            "create_soap_note",
            "update_soap_note",
            "version_soap_note",
            "create_treatment_plan",
            "update_treatment_plan",
            "discontinue_treatment_plan",
            "prescribe_medication",
            "update_prescription",
            "discontinue_medication",
            "add_medication_refill",
            "submit_previsit_response",
            "create_medication_reminder",
            "log_medication_taken",
            "report_emergency",
            "update_emergency_status",
            "create_medical_inquiry",
            "mark_inquiry_answered",
            "check_procedure_coverage",
            "join_waitlist",
            "register_user",
            "get_procedure_guidelines",
            "search_procedures",
            "add_communication_logs",
        ] {
            assert!(registry.has_tool(tool), "missing tool: {tool}");
        }

        let templates: Vec<&str> = registry
            .resource_definitions()
            .iter()
            .map(|r| r.uri_template.as_str())
            .collect();
        for template in [
            "doctors://list",
            "doctors://availability/{doctor_name}/{date}",
            "patients://summary/{name}",
            "patients://appointments/{name}",
            "appointments://doctor/{doctor_name}",
            "clinical://soap/latest/{patient_name}",
            "medications://history/{patient_name}/{start_date}/{end_date}",
            "previsit://all",
            "reminders://adherence/{patient_name}",
            "analytics://dashboard/summary/{start_date}/{end_date}",
            "clinics://all",
            "emergency://all",
            "inquiries://list",
            "insurance://providers",
            "waitlist://all",
        ] {
            assert!(templates.contains(&template), "missing resource: {template}");
        }
    }
}
