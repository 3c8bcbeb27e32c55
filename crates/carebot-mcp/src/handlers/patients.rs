//! Patient registry: phone lookup, summaries, registration.

use crate::context::ToolContext;
use crate::handlers::{required_str, string_schema};
use crate::protocol::{ResourceDefinition, ToolDefinition};
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use carebot_core::{Appointment, Patient};
use serde_json::{Value, json};
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_tool(
        ToolDefinition {
            name: "resolve_patient_by_phone".to_string(),
            description: Some(
                "Smart patient lookup by phone number. Automatically tries format \
                 variations (e.g. +971, missing 0) to absorb formatting issues."
                    .to_string(),
            ),
            input_schema: string_schema(&["phone_number"], &[]),
        },
        wrap(ctx, resolve_by_phone),
    );

    registry.register_resource(
        ResourceDefinition {
            uri_template: "patients://summary/{name}".to_string(),
            name: "patient_summary".to_string(),
            description: Some("A patient's medical and reliability summary.".to_string()),
        },
        wrap(ctx, patient_summary),
    );

    registry.register_resource(
        ResourceDefinition {
            uri_template: "patients://appointments/{name}".to_string(),
            name: "patient_appointments".to_string(),
            description: Some("All past and upcoming appointments for a patient.".to_string()),
        },
        wrap(ctx, patient_appointments),
    );

    registry.register_tool(
        ToolDefinition {
            name: "create_patient_tool".to_string(),
            description: Some("Registers a new patient in the system.".to_string()),
            input_schema: string_schema(&["first_name", "last_name", "email", "phone", "dob"], &[]),
        },
        wrap(ctx, create_patient),
    );
}

async fn resolve_by_phone(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let phone_number = required_str(&args, "phone_number")?;
    // Not-found is a normal outcome here, reported as text, not an error.
    match ctx.directory.resolve_patient_by_phone(phone_number).await {
        Some(patient) => Ok(format!("Found: {} (ID: {})", patient.first_name, patient.id)),
        None => Ok(format!("Patient not found for number: {phone_number}")),
    }
}

async fn patient_summary(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let name = required_str(&args, "name")?;
    let Some(patient_id) = ctx.directory.resolve_patient_id(name).await else {
        return Err(format!("Error: Patient '{name}' not found."));
    };

    let raw = ctx
        .client
        .get(&format!("/patients/{patient_id}"), None)
        .await
        .map_err(|err| format!("Failed to fetch patient record: {err}"))?;
    let patient: Patient =
        serde_json::from_value(raw).map_err(|err| format!("Unexpected patient payload: {err}"))?;

    Ok(format!(
        "Patient: {}\nReliability Score: {}\nMedical History: {}\nAllergies: {}",
        patient.full_name(),
        patient
            .reliability_score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        patient.medical_history.as_deref().unwrap_or("No records"),
        if patient.allergies.is_empty() {
            "None".to_string()
        } else {
            patient.allergies.join(", ")
        },
    ))
}

async fn patient_appointments(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let name = required_str(&args, "name")?;
    let Some(patient_id) = ctx.directory.resolve_patient_id(name).await else {
        return Err(format!("Error: Patient '{name}' not found."));
    };

    let raw = ctx
        .client
        .get(&format!("/patients/{patient_id}/appointments"), None)
        .await
        .map_err(|err| format!("Failed to fetch appointments: {err}"))?;
    let appointments: Vec<Appointment> = serde_json::from_value(raw).unwrap_or_default();

    if appointments.is_empty() {
        return Ok(format!("No appointments found for {name}."));
    }

    let lines: Vec<String> = appointments
        .iter()
        .map(|a| {
            format!(
                "• {} at {} - Status: {}",
                a.appointment_date, a.start_time, a.status
            )
        })
        .collect();
    Ok(format!("Appointment History for {name}:\n{}", lines.join("\n")))
}

async fn create_patient(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let first_name = required_str(&args, "first_name")?;
    let last_name = required_str(&args, "last_name")?;
    let email = required_str(&args, "email")?;
    let phone = required_str(&args, "phone")?;
    let dob = required_str(&args, "dob")?;

    let payload = json!({
        "firstName": first_name,
        "lastName": last_name,
        "email": email,
        "phoneNumber": phone,
        "dateOfBirth": dob
    });

    let response = ctx
        .client
        .post("/patients", &payload)
        .await
        .map_err(|err| format!("Failed to create patient record: {err}"))?;

    // The registry changed; the next name lookup must see the new patient.
    ctx.directory.invalidate_patients().await;

    let id = response
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    Ok(format!(
        "Successfully registered new patient: {first_name} {last_name} (ID: {id})"
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
    async fn phone_miss_is_text_not_error() {
        let server = mockito::Server::new_async().await;
        let outcome = resolve_by_phone(context_for(&server), json!({"phone_number": "0501112222"}))
            .await
            .unwrap();
        assert_eq!(outcome, "Patient not found for number: 0501112222");
    }

    #[tokio::test]
    async fn registration_invalidates_the_patient_cache() {
        let mut server = mockito::Server::new_async().await;
        // First listing: empty. After registration the handler must refetch.
        let listing = server
            .mock("GET", "/patients")
            .with_body(json!([{"id": "p-9", "first_name": "Nora", "last_name": "Aziz"}]).to_string())
            .expect(2)
            .create_async()
            .await;
        server
            .mock("POST", "/patients")
            .with_body(json!({"id": "p-9"}).to_string())
            .create_async()
            .await;

        let ctx = context_for(&server);
        ctx.directory.resolve_patient_id("Nora").await;

        let text = create_patient(
            Arc::clone(&ctx),
            json!({
                "first_name": "Nora", "last_name": "Aziz",
                "email": "nora@example.com", "phone": "0501112222", "dob": "1990-04-01"
            }),
        )
        .await
        .unwrap();
        assert!(text.contains("ID: p-9"));

        // Within TTL, but the write-through invalidation forces a refetch.
        ctx.directory.resolve_patient_id("Nora").await;
        listing.assert_async().await;
    }
}
