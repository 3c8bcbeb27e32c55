//! Capability search: points the agent at the right staff tool by intent.

use crate::context::ToolContext;
use crate::handlers::{required_str, string_schema};
use crate::protocol::ToolDefinition;
use crate::registry::{CapabilityRegistry, ToolOutcome, wrap};
use serde_json::Value;
use std::sync::Arc;

/// Intent phrases mapped to the capability that serves them.
const CATALOG: &[(&str, &str)] = &[
    ("check availability", "doctors://availability/{name}/{date}"),
    ("list staff", "doctors://list"),
    ("update schedule", "add_availability_tool"),
];

pub fn register(registry: &mut CapabilityRegistry, ctx: &Arc<ToolContext>) {
    registry.register_tool(
        ToolDefinition {
            name: "search_staff_tools".to_string(),
            description: Some(
                "Dynamically identifies relevant staff/doctor tools based on intent.".to_string(),
            ),
            input_schema: string_schema(&["query"], &[]),
        },
        wrap(ctx, search_staff_tools),
    );
}

async fn search_staff_tools(_ctx: Arc<ToolContext>, args: Value) -> ToolOutcome {
    let query = required_str(&args, "query")?.to_lowercase();

    let results: Vec<String> = CATALOG
        .iter()
        .filter(|(intent, _)| intent.contains(query.as_str()))
        .map(|(intent, target)| format!("Match: {intent} -> Use {target}"))
        .collect();

    if results.is_empty() {
        Ok("No specific staff tool matched. Try 'list staff'.".to_string())
    } else {
        Ok(results.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebot_core::CacheConfig;
    use carebot_dbops::DbOpsClient;
    use serde_json::json;

    fn dummy_context() -> Arc<ToolContext> {
        let client = Arc::new(
            DbOpsClient::new("http://localhost:0", Some("t".to_string())).unwrap(),
        );
        Arc::new(ToolContext::new(client, &CacheConfig::default()))
    }

    #[tokio::test]
    async fn intent_fragment_matches_catalog_entry() {
        let text = search_staff_tools(dummy_context(), json!({"query": "availability"}))
            .await
            .unwrap();
        assert!(text.contains("doctors://availability"));
    }

    #[tokio::test]
    async fn unknown_intent_suggests_the_fallback() {
        let text = search_staff_tools(dummy_context(), json!({"query": "order pizza"}))
            .await
            .unwrap();
        assert!(text.contains("Try 'list staff'"));
    }
}
