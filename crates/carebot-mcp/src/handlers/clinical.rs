//! Clinical records: SOAP notes and treatment plans.
//!
//! Creation tools enrich their own context: a note or plan is attached to
//! the patient's most recent appointment without the agent supplying an
//! appointment id.

use crate::context::ToolContext;
use crate::handlers::{optional_str, pretty, required_str, string_schema};
use crate::protocol::{ResourceDefinition, ToolDefinition};
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use serde_json::{Value, json};
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    // SOAP note resources
    registry.register_resource(
        ResourceDefinition {
            uri_template: "clinical://soap/all/{appointment_id}".to_string(),
            name: "appointment_soap_notes".to_string(),
            description: Some("All SOAP notes linked to a specific appointment.".to_string()),
        },
        wrap(ctx, soap_notes_for_appointment),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "clinical://soap/latest/{patient_name}".to_string(),
            name: "latest_soap_note".to_string(),
            description: Some("The most recent SOAP note from a patient's last visit.".to_string()),
        },
        wrap(ctx, latest_soap_note),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "clinical://soap/history/{appointment_id}".to_string(),
            name: "soap_note_history".to_string(),
            description: Some("Version history of SOAP notes for an appointment.".to_string()),
        },
        wrap(ctx, soap_note_history),
    );

    // Treatment plan resources
    registry.register_resource(
        ResourceDefinition {
            uri_template: "clinical://plans/active/{patient_name}".to_string(),
            name: "active_treatment_plans".to_string(),
            description: Some("All active treatment plans for a patient.".to_string()),
        },
        wrap(ctx, active_treatment_plans),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "clinical://plans/history/{patient_name}".to_string(),
            name: "treatment_plan_history".to_string(),
            description: Some("Full history of a patient's treatment plans.".to_string()),
        },
        wrap(ctx, treatment_plan_history),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "clinical://plans/appointment/{appointment_id}".to_string(),
            name: "plan_by_appointment".to_string(),
            description: Some("The treatment plan associated with an appointment.".to_string()),
        },
        wrap(ctx, plan_by_appointment),
    );

    // SOAP note tools
    registry.register_tool(
        ToolDefinition {
            name: "create_soap_note".to_string(),
            description: Some(
                "Creates a new SOAP note and attaches it to the patient's most \
                 recent appointment."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "patient_name": {"type": "string"},
                    "subjective": {"type": "string"},
                    "objective": {"type": "string"},
                    "assessment": {"type": "string"},
                    "plan": {"type": "string"},
                    "bp": {"type": "string"},
                    "hr": {"type": "integer"},
                    "temp": {"type": "number"}
                },
                "required": ["patient_name", "subjective", "objective", "assessment", "plan"]
            }),
        },
        wrap(ctx, create_soap_note),
    );
    registry.register_tool(
        ToolDefinition {
            name: "update_soap_note".to_string(),
            description: Some("Updates fields in an existing SOAP note.".to_string()),
            input_schema: string_schema(&["appointment_id", "note_id"], &["subjective", "objective"]),
        },
        wrap(ctx, update_soap_note),
    );
    registry.register_tool(
        ToolDefinition {
            name: "version_soap_note".to_string(),
            description: Some("Creates a new version of a SOAP note, preserving history.".to_string()),
            input_schema: string_schema(&["appointment_id", "note_id", "subjective", "objective"], &[]),
        },
        wrap(ctx, version_soap_note),
    );

    // Treatment plan tools
    registry.register_tool(
        ToolDefinition {
            name: "create_treatment_plan".to_string(),
            description: Some(
                "Creates a new treatment plan with initial interventions, linked \
                 to the patient's last appointment."
                    .to_string(),
            ),
            input_schema: string_schema(
                &["patient_name", "diagnosis", "medication_intervention", "lifestyle_intervention"],
                &[],
            ),
        },
        wrap(ctx, create_treatment_plan),
    );
    registry.register_tool(
        ToolDefinition {
            name: "update_treatment_plan".to_string(),
            description: Some("Updates status (e.g. 'completed') of a treatment plan.".to_string()),
            input_schema: string_schema(&["plan_id", "status", "notes"], &[]),
        },
        wrap(ctx, update_treatment_plan),
    );
    registry.register_tool(
        ToolDefinition {
            name: "discontinue_treatment_plan".to_string(),
            description: Some("Discontinues a plan (e.g. patient recovered).".to_string()),
            input_schema: string_schema(&["plan_id", "reason"], &[]),
        },
        wrap(ctx, discontinue_treatment_plan),
    );
}

async fn soap_notes_for_appointment(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let appointment_id = required_str(&args, "appointment_id")?;
    let notes = ctx
        .client
        .get(&format!("/appointments/{appointment_id}/soap-notes"), None)
        .await
        .map_err(|err| format!("Failed to fetch SOAP notes: {err}"))?;
    Ok(format!("SOAP Notes for Appt {appointment_id}:\n{}", pretty(&notes)))
}

async fn latest_soap_note(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let Some(patient_id) = ctx.directory.resolve_patient_id(patient_name).await else {
        return Err(format!("Error: Patient '{patient_name}' not found."));
    };
    let Some(appointment_id) = ctx.directory.last_appointment_id(&patient_id).await else {
        return Err(format!("Error: No recent appointment found for {patient_name}."));
    };

    // A missing latest note (404 or otherwise) is an ordinary outcome.
    match ctx
        .client
        .get(&format!("/appointments/{appointment_id}/soap-notes/latest"), None)
        .await
    {
        Ok(note) => Ok(format!(
            "Latest SOAP Note for {patient_name}:\nS: {}\nO: {}\nA: {}\nP: {}",
            note.get("subjective").and_then(Value::as_str).unwrap_or(""),
            note.get("objective").and_then(Value::as_str).unwrap_or(""),
            note.get("assessment").and_then(Value::as_str).unwrap_or(""),
            note.get("plan").and_then(Value::as_str).unwrap_or(""),
        )),
        Err(_) => Ok("No SOAP notes found for the last appointment.".to_string()),
    }
}

async fn soap_note_history(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let appointment_id = required_str(&args, "appointment_id")?;
    let history = ctx
        .client
        .get(
            &format!("/appointments/{appointment_id}/soap-notes/history"),
            None,
        )
        .await
        .map_err(|err| format!("Failed to fetch note history: {err}"))?;
    Ok(format!("Version History:\n{}", pretty(&history)))
}

async fn create_soap_note(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let subjective = required_str(&args, "subjective")?;
    let objective = required_str(&args, "objective")?;
    let assessment = required_str(&args, "assessment")?;
    let plan = required_str(&args, "plan")?;

    let Some(patient_id) = ctx.directory.resolve_patient_id(patient_name).await else {
        return Err(format!("Error: Patient '{patient_name}' not found."));
    };
    let Some(appointment_id) = ctx.directory.last_appointment_id(&patient_id).await else {
        return Err(format!(
            "Error: Could not find a recent appointment for {patient_name} to attach this note to."
        ));
    };

    let mut vital_signs = serde_json::Map::new();
    if let Some(bp) = optional_str(&args, "bp") {
        vital_signs.insert("bloodPressure".to_string(), json!(bp));
    }
    if let Some(hr) = args.get("hr").and_then(Value::as_i64) {
        vital_signs.insert("heartRate".to_string(), json!(hr));
    }
    if let Some(temp) = args.get("temp").and_then(Value::as_f64) {
        vital_signs.insert("temperature".to_string(), json!(temp));
    }

    let payload = json!({
        "subjective": subjective,
        "objective": objective,
        "assessment": assessment,
        "plan": plan,
        "vitalSigns": vital_signs
    });

    ctx.client
        .post(&format!("/appointments/{appointment_id}/soap-notes"), &payload)
        .await
        .map_err(|err| format!("Failed to create note: {err}"))?;

    Ok(format!(
        "SOAP note created for {patient_name} (Appt: {appointment_id})."
    ))
}

async fn update_soap_note(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let appointment_id = required_str(&args, "appointment_id")?;
    let note_id = required_str(&args, "note_id")?;

    let mut payload = serde_json::Map::new();
    if let Some(subjective) = optional_str(&args, "subjective") {
        payload.insert("subjective".to_string(), json!(subjective));
    }
    if let Some(objective) = optional_str(&args, "objective") {
        payload.insert("objective".to_string(), json!(objective));
    }

    ctx.client
        .put(
            &format!("/appointments/{appointment_id}/soap-notes/{note_id}"),
            &Value::Object(payload),
        )
        .await
        .map_err(|err| format!("Update failed: {err}"))?;

    Ok(format!("SOAP note {note_id} updated."))
}

async fn version_soap_note(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let appointment_id = required_str(&args, "appointment_id")?;
    let note_id = required_str(&args, "note_id")?;
    let subjective = required_str(&args, "subjective")?;
    let objective = required_str(&args, "objective")?;

    ctx.client
        .post(
            &format!("/appointments/{appointment_id}/soap-notes/{note_id}/new-version"),
            &json!({"subjective": subjective, "objective": objective}),
        )
        .await
        .map_err(|err| format!("Versioning failed: {err}"))?;

    Ok(format!("New version created for note {note_id}."))
}

async fn active_treatment_plans(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let Some(patient_id) = ctx.directory.resolve_patient_id(patient_name).await else {
        return Err(format!("Error: Patient '{patient_name}' not found."));
    };

    let plans = ctx
        .client
        .get(
            &format!("/treatment-plans/patient/{patient_id}"),
            Some(&[("status", "active")]),
        )
        .await
        .map_err(|err| format!("Failed to fetch treatment plans: {err}"))?;

    if plans.is_null() || plans.as_array().is_some_and(Vec::is_empty) {
        return Ok(format!("No active treatment plans for {patient_name}."));
    }
    Ok(format!("Active Plans for {patient_name}:\n{}", pretty(&plans)))
}

async fn treatment_plan_history(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let Some(patient_id) = ctx.directory.resolve_patient_id(patient_name).await else {
        return Err(format!("Error: Patient '{patient_name}' not found."));
    };

    let history = ctx
        .client
        .get(&format!("/treatment-plans/patient/{patient_id}/history"), None)
        .await
        .map_err(|err| format!("Failed to fetch plan history: {err}"))?;
    Ok(pretty(&history))
}

async fn plan_by_appointment(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let appointment_id = required_str(&args, "appointment_id")?;
    let plan = ctx
        .client
        .get(&format!("/treatment-plans/appointment/{appointment_id}"), None)
        .await
        .map_err(|err| format!("Failed to fetch the plan: {err}"))?;
    Ok(pretty(&plan))
}

async fn create_treatment_plan(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let diagnosis = required_str(&args, "diagnosis")?;
    let medication_intervention = required_str(&args, "medication_intervention")?;
    let lifestyle_intervention = required_str(&args, "lifestyle_intervention")?;

    // Both derived ids must exist before the write goes out.
    let Some(patient_id) = ctx.directory.resolve_patient_id(patient_name).await else {
        return Err(format!(
            "Error: Patient '{patient_name}' not found. No plan was created."
        ));
    };
    let Some(appointment_id) = ctx.directory.last_appointment_id(&patient_id).await else {
        return Err(format!(
            "Error: No recent appointment found for {patient_name} to link the plan to."
        ));
    };

    let payload = json!({
        "patientId": patient_id,
        "appointmentId": appointment_id,
        "diagnosis": diagnosis,
        "status": "active",
        "interventions": [
            {"type": "medication", "description": medication_intervention, "priority": "high"},
            {"type": "lifestyle", "description": lifestyle_intervention, "priority": "medium"}
        ]
    });

    ctx.client
        .post("/treatment-plans", &payload)
        .await
        .map_err(|err| format!("Creation failed: {err}"))?;

    Ok(format!("Treatment plan created for {diagnosis}."))
}

async fn update_treatment_plan(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let plan_id = required_str(&args, "plan_id")?;
    let status = required_str(&args, "status")?;
    let notes = required_str(&args, "notes")?;

    ctx.client
        .put(
            &format!("/treatment-plans/{plan_id}"),
            &json!({"status": status, "notes": notes}),
        )
        .await
        .map_err(|err| format!("Update failed: {err}"))?;

    Ok(format!("Plan {plan_id} updated to {status}."))
}

async fn discontinue_treatment_plan(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let plan_id = required_str(&args, "plan_id")?;
    let reason = required_str(&args, "reason")?;

    ctx.client
        .post(
            &format!("/treatment-plans/{plan_id}/discontinue"),
            &json!({"reason": reason}),
        )
        .await
        .map_err(|err| format!("Discontinue failed: {err}"))?;

    Ok(format!("Plan {plan_id} discontinued."))
}
