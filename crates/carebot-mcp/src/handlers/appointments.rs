//! Appointments: doctor schedules, booking, cancellation.

use crate::context::ToolContext;
use crate::handlers::{optional_str, required_str, string_schema};
use crate::protocol::{ResourceDefinition, ToolDefinition};
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use carebot_core::Appointment;
use serde_json::{Value, json};
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_resource(
        ResourceDefinition {
            uri_template: "appointments://doctor/{doctor_name}".to_string(),
            name: "doctor_appointments".to_string(),
            description: Some("All appointments for a specific doctor by name.".to_string()),
        },
        wrap(ctx, doctor_appointments),
    );

    registry.register_tool(
        ToolDefinition {
            name: "book_appointment".to_string(),
            description: Some(
                "Books a new appointment using human names. \
                 Example: 'Book John Doe with Dr. Smith on 2025-12-25 at 10:00'."
                    .to_string(),
            ),
            input_schema: string_schema(
                &["patient_name", "doctor_name", "date", "start_time", "end_time"],
                &["notes"],
            ),
        },
        wrap(ctx, book_appointment),
    );

    registry.register_tool(
        ToolDefinition {
            name: "cancel_appointment".to_string(),
            description: Some("Cancels an existing appointment using the appointment ID.".to_string()),
            input_schema: string_schema(&["appointment_id", "reason"], &[]),
        },
        wrap(ctx, cancel_appointment),
    );
}

async fn doctor_appointments(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let doctor_name = required_str(&args, "doctor_name")?;
    let Some(doctor_id) = ctx.directory.resolve_doctor_id(doctor_name).await else {
        return Err(format!("Error: Doctor '{doctor_name}' not found."));
    };

    // The primary listing returns every appointment; filter locally.
    let raw = ctx
        .client
        .get("/appointments", None)
        .await
        .map_err(|err| format!("Failed to fetch appointments: {err}"))?;
    let appointments: Vec<Appointment> = serde_json::from_value(raw).unwrap_or_default();
    let for_doctor: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| a.doctor_id == doctor_id)
        .collect();

    if for_doctor.is_empty() {
        return Ok(format!("No appointments found for {doctor_name}."));
    }

    let lines: Vec<String> = for_doctor
        .iter()
        .map(|a| {
            format!(
                "• {} at {} (Status: {})",
                a.appointment_date, a.start_time, a.status
            )
        })
        .collect();
    Ok(format!("Schedule for {doctor_name}:\n{}", lines.join("\n")))
}

async fn book_appointment(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let doctor_name = required_str(&args, "doctor_name")?;
    let date = required_str(&args, "date")?;
    let start_time = required_str(&args, "start_time")?;
    let end_time = required_str(&args, "end_time")?;
    let notes = optional_str(&args, "notes").unwrap_or("");

    // Every identifier must resolve before anything is written; the message
    // names the one that did not.
    let Some(doctor_id) = ctx.directory.resolve_doctor_id(doctor_name).await else {
        return Err(format!(
            "Error: Could not resolve doctor '{doctor_name}'. No appointment was booked."
        ));
    };
    let Some(patient_id) = ctx.directory.resolve_patient_id(patient_name).await else {
        return Err(format!(
            "Error: Could not resolve patient '{patient_name}'. No appointment was booked."
        ));
    };
    let clinic_id = ctx.directory.default_clinic_id().await;

    let payload = json!({
        "clinic_id": clinic_id,
        "patient_id": patient_id,
        "doctor_id": doctor_id,
        "appointment_date": date,
        "start_time": start_time,
        "end_time": end_time,
        "status": "scheduled",
        "notes": notes
    });

    ctx.client
        .post("/appointments", &payload)
        .await
        .map_err(|err| format!("Failed to book appointment: {err}"))?;

    Ok(format!(
        "Appointment confirmed for {patient_name} with {doctor_name} on {date} at {start_time}."
    ))
}

async fn cancel_appointment(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let appointment_id = required_str(&args, "appointment_id")?;
    let reason = required_str(&args, "reason")?;

    ctx.client
        .patch(
            &format!("/appointments/{appointment_id}/cancel"),
            &json!({"cancellation_reason": reason}),
        )
        .await
        .map_err(|err| format!("Cancellation failed: {err}"))?;

    Ok(format!("Appointment {appointment_id} has been cancelled."))
}
