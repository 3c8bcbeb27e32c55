//! Revenue analytics resources. Pure pass-through formatting; all
//! aggregation stays in the backend.

use crate::context::ToolContext;
use crate::handlers::{field_text, pretty, required_str};
use crate::protocol::ResourceDefinition;
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use serde_json::Value;
use std::sync::Arc;

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_resource(
        ResourceDefinition {
            uri_template: "analytics://revenue/comprehensive/{start_date}/{end_date}".to_string(),
            name: "comprehensive_revenue".to_string(),
            description: Some("Detailed revenue analytics including breakdown.".to_string()),
        },
        wrap(ctx, comprehensive_revenue),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "analytics://revenue/raw/{start_date}/{end_date}".to_string(),
            name: "revenue_data_only".to_string(),
            description: Some("Raw revenue figures without metadata.".to_string()),
        },
        wrap(ctx, revenue_data_only),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "analytics://revenue/trend/monthly/{start_date}/{end_date}".to_string(),
            name: "monthly_trend".to_string(),
            description: Some("Monthly revenue breakdown for trend analysis.".to_string()),
        },
        wrap(ctx, monthly_trend),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "analytics://revenue/trend/daily/{start_date}/{end_date}".to_string(),
            name: "daily_trend".to_string(),
            description: Some("Daily revenue breakdown.".to_string()),
        },
        wrap(ctx, daily_trend),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "analytics://performance/specialty/{start_date}/{end_date}".to_string(),
            name: "specialty_performance".to_string(),
            description: Some("Revenue performance by dental specialty.".to_string()),
        },
        wrap(ctx, specialty_performance),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "analytics://performance/doctors/{start_date}/{end_date}".to_string(),
            name: "top_doctors".to_string(),
            description: Some("Doctor ranking by revenue.".to_string()),
        },
        wrap(ctx, top_doctors),
    );
    registry.register_resource(
        ResourceDefinition {
            uri_template: "analytics://dashboard/summary/{start_date}/{end_date}".to_string(),
            name: "dashboard_summary".to_string(),
            description: Some("High-level executive dashboard summary.".to_string()),
        },
        wrap(ctx, dashboard_summary),
    );
}

async fn fetch_analytics(
    ctx: &ToolContext,
    path: &str,
    args: &Value,
) -> Result<(Value, String, String), String> {
    let start_date = required_str(args, "start_date")?.to_string();
    let end_date = required_str(args, "end_date")?.to_string();
    let data = ctx
        .client
        .get(
            path,
            Some(&[("startDate", start_date.as_str()), ("endDate", end_date.as_str())]),
        )
        .await
        .map_err(|err| format!("Failed to fetch analytics: {err}"))?;
    Ok((data, start_date, end_date))
}

async fn comprehensive_revenue(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let (data, start, end) = fetch_analytics(&ctx, "/analytics/revenue", &args).await?;
    Ok(format!("Comprehensive Report ({start}-{end}): {}", pretty(&data)))
}

async fn revenue_data_only(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let (data, _, _) = fetch_analytics(&ctx, "/analytics/revenue/data", &args).await?;
    Ok(format!("Raw Revenue Data: {}", pretty(&data)))
}

async fn monthly_trend(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let (data, _, _) = fetch_analytics(&ctx, "/analytics/revenue/monthly-trend", &args).await?;
    let lines: Vec<String> = data
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .map(|item| format!("{}: ${}", field_text(&item["month"]), field_text(&item["revenue"])))
        .collect();
    Ok(format!("Monthly Trends:\n{}", lines.join("\n")))
}

async fn daily_trend(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let (data, _, _) = fetch_analytics(&ctx, "/analytics/revenue/daily-trend", &args).await?;
    let lines: Vec<String> = data
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .map(|item| format!("{}: ${}", field_text(&item["date"]), field_text(&item["revenue"])))
        .collect();
    Ok(format!("Daily Trends:\n{}", lines.join("\n")))
}

async fn specialty_performance(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let (data, _, _) = fetch_analytics(&ctx, "/analytics/specialty-performance", &args).await?;
    let lines: Vec<String> = data
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .map(|s| {
            format!(
                "• {}: ${} ({} apps)",
                field_text(&s["specialty"]),
                field_text(&s["revenue"]),
                field_text(&s["appointments"])
            )
        })
        .collect();
    Ok(format!("Specialty Performance:\n{}", lines.join("\n")))
}

async fn top_doctors(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let (data, _, _) = fetch_analytics(&ctx, "/analytics/top-doctors", &args).await?;
    let lines: Vec<String> = data
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, d)| {
            format!(
                "#{} {}: ${} ({} apps)",
                i + 1,
                field_text(&d["name"]),
                field_text(&d["revenue"]),
                field_text(&d["appointmentCount"])
            )
        })
        .collect();
    Ok(format!("Top Doctors:\n{}", lines.join("\n")))
}

async fn dashboard_summary(ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let (data, start, end) = fetch_analytics(&ctx, "/analytics/dashboard", &args).await?;
    let summary = data.get("summary").cloned().unwrap_or(Value::Null);
    Ok(format!(
        "Dashboard ({start}-{end}):\nActive Patients: {}\nNew Patients: {}\nFuture Appts: {}",
        field_text(&summary["activePatients"]),
        field_text(&summary["newPatientsThisMonth"]),
        field_text(&summary["upcomingAppointments"]),
    ))
}
