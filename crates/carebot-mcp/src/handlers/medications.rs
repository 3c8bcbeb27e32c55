//! Medication management: listings, prescriptions, refills.

use crate::context::ToolContext;
use crate::handlers::{optional_str, pretty, required_str, string_schema};
use crate::protocol::{ResourceDefinition, ToolDefinition};
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use carebot_core::Medication;
use serde_json::{Value, json};
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_resource(
        ResourceDefinition {
            uri_template: "medications://all/{patient_name}".to_string(),
            name: "all_medications".to_string(),
            description: Some("All medications (active and past) for a patient.".to_string()),
        },
        wrap(ctx, all_medications),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "medications://active/{patient_name}".to_string(),
            name: "active_medications".to_string(),
            description: Some("Only the active medications for a patient.".to_string()),
        },
        wrap(ctx, active_medications),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "medications://history/{patient_name}/{start_date}/{end_date}".to_string(),
            name: "medication_history".to_string(),
            description: Some("Medication history within a date range.".to_string()),
        },
        wrap(ctx, medication_history),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "medications://statistics/{patient_name}".to_string(),
            name: "medication_statistics".to_string(),
            description: Some("Adherence and prescription statistics.".to_string()),
        },
        wrap(ctx, medication_statistics),
    );

    registry.register_tool(
        ToolDefinition {
            name: "prescribe_medication".to_string(),
            description: Some("Prescribes a new medication to a patient.".to_string()),
            input_schema: string_schema(
                &["patient_name", "medication_name", "dosage", "frequency", "start_date", "instructions"],
                &[],
            ),
        },
        wrap(ctx, prescribe_medication),
    );
    registry.register_tool(
        ToolDefinition {
            name: "update_prescription".to_string(),
            description: Some("Updates dosage or frequency for an existing medication.".to_string()),
            input_schema: string_schema(
                &["patient_name", "medication_name"],
                &["new_dosage", "new_frequency"],
            ),
        },
        wrap(ctx, update_prescription),
    );
    registry.register_tool(
        ToolDefinition {
            name: "discontinue_medication".to_string(),
            description: Some("Stops a medication, recording the reason.".to_string()),
            input_schema: string_schema(&["patient_name", "medication_name", "reason"], &[]),
        },
        wrap(ctx, discontinue_medication),
    );
    registry.register_tool(
        ToolDefinition {
            name: "add_medication_refill".to_string(),
            description: Some("Logs a refill for a specific medication.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "patient_name": {"type": "string"},
                    "medication_name": {"type": "string"},
                    "refill_date": {"type": "string"},
                    "quantity": {"type": "integer"},
                    "pharmacy": {"type": "string"}
                },
                "required": ["patient_name", "medication_name", "refill_date", "quantity", "pharmacy"]
            }),
        },
        wrap(ctx, add_medication_refill),
    );
}

async fn resolve_patient(ctx: &ToolContext, name: &str) -> Result<String, String> {
    ctx.directory
        .resolve_patient_id(name)
        .await
        .ok_or_else(|| format!("Error: Patient '{name}' not found."))
}

async fn all_medications(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let patient_id = resolve_patient(&ctx, patient_name).await?;

    let raw = ctx
        .client
        .get(&format!("/patients/{patient_id}/medications"), None)
        .await
        .map_err(|err| format!("Failed to fetch medications: {err}"))?;
    let medications: Vec<Medication> = serde_json::from_value(raw).unwrap_or_default();

    if medications.is_empty() {
        return Ok(format!("No medication records found for {patient_name}."));
    }

    let lines: Vec<String> = medications
        .iter()
        .map(|m| {
            format!(
                "• {} ({}) - {}",
                m.medication_name,
                m.status.as_deref().unwrap_or("unknown"),
                m.dosage.as_deref().unwrap_or("n/a")
            )
        })
        .collect();
    Ok(format!(
        "Full Medication List for {patient_name}:\n{}",
        lines.join("\n")
    ))
}

async fn active_medications(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let patient_id = resolve_patient(&ctx, patient_name).await?;

    let raw = ctx
        .client
        .get(&format!("/patients/{patient_id}/medications/active"), None)
        .await
        .map_err(|err| format!("Failed to fetch active medications: {err}"))?;
    let medications: Vec<Medication> = serde_json::from_value(raw).unwrap_or_default();

    if medications.is_empty() {
        return Ok(format!("{patient_name} has no active medications."));
    }

    let lines: Vec<String> = medications
        .iter()
        .map(|m| {
            format!(
                "• {} - {} ({})",
                m.medication_name,
                m.dosage.as_deref().unwrap_or("n/a"),
                m.frequency.as_deref().unwrap_or("n/a")
            )
        })
        .collect();
    Ok(format!(
        "Active Prescriptions for {patient_name}:\n{}",
        lines.join("\n")
    ))
}

async fn medication_history(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let start_date = required_str(&args, "start_date")?;
    let end_date = required_str(&args, "end_date")?;
    let patient_id = resolve_patient(&ctx, patient_name).await?;

    let history = ctx
        .client
        .get(
            &format!("/patients/{patient_id}/medications/history"),
            Some(&[("startDate", start_date), ("endDate", end_date)]),
        )
        .await
        .map_err(|err| format!("Failed to fetch medication history: {err}"))?;

    Ok(format!(
        "Medication History ({start_date} to {end_date}):\n{}",
        pretty(&history)
    ))
}

async fn medication_statistics(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let patient_id = resolve_patient(&ctx, patient_name).await?;

    let stats = ctx
        .client
        .get(&format!("/patients/{patient_id}/medications/statistics"), None)
        .await
        .map_err(|err| format!("Failed to fetch medication statistics: {err}"))?;
    Ok(format!("Medication Stats for {patient_name}:\n{}", pretty(&stats)))
}

async fn prescribe_medication(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let medication_name = required_str(&args, "medication_name")?;
    let dosage = required_str(&args, "dosage")?;
    let frequency = required_str(&args, "frequency")?;
    let start_date = required_str(&args, "start_date")?;
    let instructions = required_str(&args, "instructions")?;
    let patient_id = resolve_patient(&ctx, patient_name).await?;

    let payload = json!({
        "medicationName": medication_name,
        "dosage": dosage,
        "frequency": frequency,
        "startDate": start_date,
        "instructions": instructions
    });

    ctx.client
        .post(&format!("/patients/{patient_id}/medications"), &payload)
        .await
        .map_err(|err| format!("Failed to prescribe: {err}"))?;

    Ok(format!("Prescribed {medication_name} to {patient_name}."))
}

async fn update_prescription(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let medication_name = required_str(&args, "medication_name")?;
    let patient_id = resolve_patient(&ctx, patient_name).await?;

    let Some(medication_id) = ctx
        .directory
        .resolve_medication_id(&patient_id, medication_name)
        .await
    else {
        return Err(format!(
            "Error: Active medication '{medication_name}' not found for this patient."
        ));
    };

    let mut payload = serde_json::Map::new();
    if let Some(dosage) = optional_str(&args, "new_dosage") {
        payload.insert("dosage".to_string(), json!(dosage));
    }
    if let Some(frequency) = optional_str(&args, "new_frequency") {
        payload.insert("frequency".to_string(), json!(frequency));
    }

    ctx.client
        .put(
            &format!("/patients/{patient_id}/medications/{medication_id}"),
            &Value::Object(payload),
        )
        .await
        .map_err(|err| format!("Update failed: {err}"))?;

    Ok(format!("Updated {medication_name} prescription details."))
}

async fn discontinue_medication(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let medication_name = required_str(&args, "medication_name")?;
    let reason = required_str(&args, "reason")?;
    let patient_id = resolve_patient(&ctx, patient_name).await?;

    let Some(medication_id) = ctx
        .directory
        .resolve_medication_id(&patient_id, medication_name)
        .await
    else {
        return Err(format!("Error: Medication '{medication_name}' not found."));
    };

    ctx.client
        .post(
            &format!("/patients/{patient_id}/medications/{medication_id}/discontinue"),
            &json!({"reason": reason}),
        )
        .await
        .map_err(|err| format!("Failed to discontinue: {err}"))?;

    Ok(format!("Discontinued {medication_name}. Reason: {reason}"))
}

async fn add_medication_refill(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let patient_name = required_str(&args, "patient_name")?;
    let medication_name = required_str(&args, "medication_name")?;
    let refill_date = required_str(&args, "refill_date")?;
    let quantity = args
        .get("quantity")
        .and_then(Value::as_i64)
        .ok_or_else(|| "Missing required parameter 'quantity'.".to_string())?;
    let pharmacy = required_str(&args, "pharmacy")?;
    let patient_id = resolve_patient(&ctx, patient_name).await?;

    let Some(medication_id) = ctx
        .directory
        .resolve_medication_id(&patient_id, medication_name)
        .await
    else {
        return Err(format!("Error: Medication '{medication_name}' not found."));
    };

    let payload = json!({
        "refillDate": refill_date,
        "quantity": quantity,
        "pharmacy": pharmacy
    });

    ctx.client
        .post(
            &format!("/patients/{patient_id}/medications/{medication_id}/refill"),
            &payload,
        )
        .await
        .map_err(|err| format!("Failed to add refill: {err}"))?;

    Ok(format!("Refill added for {medication_name} at {pharmacy}."))
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
    async fn refill_resolves_the_medication_by_name() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/patients")
            .with_body(json!([{"id": "p-1", "first_name": "Jane", "last_name": "Doe"}]).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/patients/p-1/medications")
            .with_body(json!([{"id": "m-2", "medicationName": "Metformin 500mg"}]).to_string())
            .create_async()
            .await;
        let write = server
            .mock("POST", "/patients/p-1/medications/m-2/refill")
            .match_body(mockito::Matcher::Json(json!({
                "refillDate": "2025-06-01", "quantity": 30, "pharmacy": "Central"
            })))
            .with_body("{}")
            .create_async()
            .await;

        let text = add_medication_refill(
            context_for(&server),
            json!({
                "patient_name": "Jane", "medication_name": "metformin",
                "refill_date": "2025-06-01", "quantity": 30, "pharmacy": "Central"
            }),
        )
        .await
        .unwrap();

        assert!(text.contains("Refill added for metformin at Central."));
        write.assert_async().await;
    }

    #[tokio::test]
    async fn unknown_medication_aborts_the_update() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/patients")
            .with_body(json!([{"id": "p-1", "first_name": "Jane", "last_name": "Doe"}]).to_string())
            .create_async()
            .await;
        server
            .mock("GET", "/patients/p-1/medications")
            .with_body("[]")
            .create_async()
            .await;

        let err = update_prescription(
            context_for(&server),
            json!({"patient_name": "Jane", "medication_name": "Nope", "new_dosage": "10mg"}),
        )
        .await
        .unwrap_err();
        assert!(err.contains("'Nope' not found"));
    }
}
