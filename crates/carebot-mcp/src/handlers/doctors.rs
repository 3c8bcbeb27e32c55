//! Staff registry: listing, availability, schedule updates.

use crate::context::ToolContext;
use crate::handlers::{required_str, string_schema};
use crate::protocol::{ResourceDefinition, ToolDefinition};
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use carebot_core::AvailabilitySlot;
use serde_json::{Value, json};
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_resource(
        ResourceDefinition {
            uri_template: "doctors://list".to_string(),
            name: "list_all_doctors".to_string(),
            description: Some("Human-friendly list of all doctors and their titles.".to_string()),
        },
        wrap(ctx, list_doctors),
    );

    registry.register_resource(
        ResourceDefinition {
            uri_template: "doctors://availability/{doctor_name}/{date}".to_string(),
            name: "doctor_availability".to_string(),
            description: Some("Availability slots for a doctor on a specific date.".to_string()),
        },
        wrap(ctx, doctor_availability),
    );

    registry.register_tool(
        ToolDefinition {
            name: "get_doctors".to_string(),
            description: Some("Lists all doctors. Alias for the doctors://list resource.".to_string()),
            input_schema: string_schema(&[], &[]),
        },
        wrap(ctx, list_doctors),
    );

    registry.register_tool(
        ToolDefinition {
            name: "add_availability_tool".to_string(),
            description: Some("Sets a doctor's weekly availability using their name.".to_string()),
            input_schema: string_schema(&["doctor_name", "day_of_week", "start_time", "end_time"], &[]),
        },
        wrap(ctx, add_availability),
    );
}

async fn list_doctors(ctx: Arc<ToolContext>, _args: Value) -> ToolOutcome {
    let doctors = ctx
        .directory
        .doctors()
        .await
        .map_err(|err| format!("Failed to fetch the staff registry: {err}"))?;

    let lines: Vec<String> = doctors
        .iter()
        .map(|d| {
            format!(
                "- {} ({}) | Languages: {}",
                d.full_name(),
                d.title,
                d.languages_spoken.join(", ")
            )
        })
        .collect();
    Ok(format!("Clinic Staff Registry:\n{}", lines.join("\n")))
}

async fn doctor_availability(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let doctor_name = required_str(&args, "doctor_name")?;
    let date = required_str(&args, "date")?;

    let Some(doctor_id) = ctx.directory.resolve_doctor_id(doctor_name).await else {
        return Err(format!("Could not find doctor matching '{doctor_name}'"));
    };

    let raw = ctx
        .client
        .get(
            &format!("/doctors/{doctor_id}/availability"),
            Some(&[("date", date)]),
        )
        .await
        .map_err(|err| format!("Failed to fetch availability: {err}"))?;

    let slots: Vec<AvailabilitySlot> = serde_json::from_value(raw).unwrap_or_default();
    if slots.is_empty() {
        return Ok(format!(
            "No specific availability slots found for {doctor_name} on {date}."
        ));
    }

    let lines: Vec<String> = slots
        .iter()
        .map(|s| {
            format!(
                "• {} - {}: {}",
                s.start_time,
                s.end_time,
                if s.is_available { "Available" } else { "Booked" }
            )
        })
        .collect();
    Ok(format!(
        "Availability for {doctor_name} on {date}:\n{}",
        lines.join("\n")
    ))
}

async fn add_availability(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let doctor_name = required_str(&args, "doctor_name")?;
    let day_of_week = required_str(&args, "day_of_week")?;
    let start_time = required_str(&args, "start_time")?;
    let end_time = required_str(&args, "end_time")?;

    let Some(doctor_id) = ctx.directory.resolve_doctor_id(doctor_name).await else {
        return Err(format!("Error: Doctor '{doctor_name}' not found."));
    };

    let payload = json!({
        "doctor_id": doctor_id,
        "day_of_week": day_of_week.to_lowercase(),
        "start_time": start_time,
        "end_time": end_time,
        "is_available": true
    });

    ctx.client
        .post("/doctors/availability", &payload)
        .await
        .map_err(|err| format!("API error while updating availability: {err}"))?;

    Ok(format!(
        "Added {day_of_week} availability for {doctor_name} ({start_time}-{end_time})."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebot_core::CacheConfig;
    use carebot_dbops::DbOpsClient;

    fn context_for(server: &mockito::ServerGuard) -> Arc<ToolContext> {
        let client = Arc::new(DbOpsClient::new(server.url(), Some("t".to_string())).unwrap());
        Arc::new(ToolContext::new(client, &CacheConfig::default()))
    }

    #[tokio::test]
    async fn staff_registry_formats_one_line_per_doctor() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/doctors")
            .with_body(
                json!([
                    {"id": "doc-1", "first_name": "John", "last_name": "Smith",
                     "title": "Dentist", "languages_spoken": ["en", "ar"]}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let text = list_doctors(context_for(&server), json!({})).await.unwrap();
        assert!(text.starts_with("Clinic Staff Registry:"));
        assert!(text.contains("- John Smith (Dentist) | Languages: en, ar"));
    }

    #[tokio::test]
    async fn availability_reports_unknown_doctor() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/doctors").with_body("[]").create_async().await;

        let err = doctor_availability(
            context_for(&server),
            json!({"doctor_name": "Zzz", "date": "2025-12-25"}),
        )
        .await
        .unwrap_err();
        assert_eq!(err, "Could not find doctor matching 'Zzz'");
    }
}
