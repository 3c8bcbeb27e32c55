//! Capability registry: the explicit table of tools and resources.
//!
//! The registry maps tool names to handler functions and resource URI
//! templates to handler functions, each with its metadata. It is assembled
//! once at startup by [`crate::catalog::build_registry`]; nothing registers
//! itself through import-time side effects.

use crate::context::ToolContext;
use crate::protocol::{ResourceDefinition, ToolDefinition};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future every handler returns.
pub type HandlerFuture = Pin<Box<dyn Future<Output = String> + Send>>;

/// A registered handler: JSON arguments in, human-readable text out.
pub type Handler = Arc<dyn Fn(Value) -> HandlerFuture + Send + Sync>;

/// Outcome of a handler body. `Err` carries the user-facing message for a
/// failed or aborted operation; both sides end up as text.
pub type ToolOutcome = Result<String, String>;

/// Adapt an async handler function into a [`Handler`].
///
/// The Ok/Err distinction is flattened here: the contract with the calling
/// agent is "always return text", so failure messages are returned the same
/// way as results.
pub fn wrap<F, Fut>(ctx: &Arc<ToolContext>, f: F) -> Handler
where
    F: Fn(Arc<ToolContext>, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ToolOutcome> + Send + 'static,
{
    let ctx = Arc::clone(ctx);
    Arc::new(move |args| -> HandlerFuture {
        let fut = f(Arc::clone(&ctx), args);
        Box::pin(async move { fut.await.unwrap_or_else(|message| message) })
    })
}

/// A tool with its metadata and handler.
pub struct RegisteredTool {
    pub definition: ToolDefinition,
    handler: Handler,
}

/// A resource with its metadata, parsed template, and handler.
pub struct RegisteredResource {
    pub definition: ResourceDefinition,
    template: UriTemplate,
    handler: Handler,
}

/// Registry of available tools and resources.
pub struct CapabilityRegistry {
    tools: HashMap<String, RegisteredTool>,
    resources: Vec<RegisteredResource>,
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            resources: Vec::new(),
        }
    }

    /// Register a tool.
    pub fn register_tool(&mut self, definition: ToolDefinition, handler: Handler) {
        self.tools
            .insert(definition.name.clone(), RegisteredTool { definition, handler });
    }

    /// Register a resource. Its URI template is parsed at registration time;
    /// reads match templates in registration order.
    pub fn register_resource(&mut self, definition: ResourceDefinition, handler: Handler) {
        let template = UriTemplate::parse(&definition.uri_template);
        self.resources.push(RegisteredResource {
            definition,
            template,
            handler,
        });
    }

    /// Check if a tool exists.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All tool definitions, sorted by name for stable listings.
    pub fn tool_definitions(&self) -> Vec<&ToolDefinition> {
        let mut definitions: Vec<_> = self.tools.values().map(|t| &t.definition).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// All resource definitions, in registration order.
    pub fn resource_definitions(&self) -> Vec<&ResourceDefinition> {
        self.resources.iter().map(|r| &r.definition).collect()
    }

    /// Number of registered tools.
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Number of registered resources.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Invoke a tool by name. Returns `None` for an unknown tool.
    pub async fn call_tool(&self, name: &str, args: Value) -> Option<String> {
        let tool = self.tools.get(name)?;
        Some((tool.handler)(args).await)
    }

    /// Read a resource by URI. The first matching template wins; its
    /// extracted parameters are passed to the handler as a JSON object,
    /// identical in shape to tool arguments.
    pub async fn read_resource(&self, uri: &str) -> Option<String> {
        for resource in &self.resources {
            if let Some(params) = resource.template.match_uri(uri) {
                return Some((resource.handler)(params).await);
            }
        }
        None
    }
}

/// A parsed `scheme://segment/{param}/segment` template.
struct UriTemplate {
    scheme: String,
    segments: Vec<Segment>,
}

enum Segment {
    Literal(String),
    Param(String),
}

impl UriTemplate {
    fn parse(template: &str) -> Self {
        let (scheme, rest) = template.split_once("://").unwrap_or(("", template));
        let segments = rest
            .split('/')
            .map(|segment| {
                segment
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                    .map(|name| Segment::Param(name.to_string()))
                    .unwrap_or_else(|| Segment::Literal(segment.to_string()))
            })
            .collect();
        Self {
            scheme: scheme.to_string(),
            segments,
        }
    }

    /// Match a concrete URI, returning extracted parameters on success.
    /// Segment counts must agree exactly; parameters match single segments.
    fn match_uri(&self, uri: &str) -> Option<Value> {
        let (scheme, rest) = uri.split_once("://")?;
        if scheme != self.scheme {
            return None;
        }

        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = Map::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(expected) if expected == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), Value::String(part.to_string()));
                }
            }
        }
        Some(Value::Object(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop_handler(reply: &'static str) -> Handler {
        Arc::new(move |_args| -> HandlerFuture {
            Box::pin(async move { reply.to_string() })
        })
    }

    fn echo_handler() -> Handler {
        Arc::new(|args| -> HandlerFuture { Box::pin(async move { args.to_string() }) })
    }

    fn tool(name: &str) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            description: Some(format!("Test tool: {name}")),
            input_schema: json!({"type": "object"}),
        }
    }

    fn resource(template: &str) -> ResourceDefinition {
        ResourceDefinition {
            uri_template: template.to_string(),
            name: template.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn registered_tool_is_dispatched() {
        let mut registry = CapabilityRegistry::new();
        registry.register_tool(tool("greet"), noop_handler("hello"));

        assert!(registry.has_tool("greet"));
        assert_eq!(
            registry.call_tool("greet", json!({})).await.as_deref(),
            Some("hello")
        );
        assert!(registry.call_tool("missing", json!({})).await.is_none());
    }

    #[tokio::test]
    async fn tool_definitions_are_sorted_by_name() {
        let mut registry = CapabilityRegistry::new();
        registry.register_tool(tool("zeta"), noop_handler(""));
        registry.register_tool(tool("alpha"), noop_handler(""));

        let names: Vec<_> = registry.tool_definitions().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn template_parameters_are_extracted_in_order() {
        let mut registry = CapabilityRegistry::new();
        registry.register_resource(
            resource("doctors://availability/{doctor_name}/{date}"),
            echo_handler(),
        );

        let reply = registry
            .read_resource("doctors://availability/Dr. Smith/2025-12-25")
            .await
            .unwrap();
        let params: Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(params["doctor_name"], "Dr. Smith");
        assert_eq!(params["date"], "2025-12-25");
    }

    #[tokio::test]
    async fn literal_template_matches_exactly() {
        let mut registry = CapabilityRegistry::new();
        registry.register_resource(resource("previsit://all"), noop_handler("all"));

        assert_eq!(
            registry.read_resource("previsit://all").await.as_deref(),
            Some("all")
        );
        assert!(registry.read_resource("previsit://none").await.is_none());
        assert!(registry.read_resource("previsit://all/extra").await.is_none());
    }

    #[tokio::test]
    async fn scheme_mismatch_does_not_match() {
        let mut registry = CapabilityRegistry::new();
        registry.register_resource(resource("waitlist://all"), noop_handler("w"));

        assert!(registry.read_resource("previsit://all").await.is_none());
    }

    #[tokio::test]
    async fn segment_count_must_agree() {
        let mut registry = CapabilityRegistry::new();
        registry.register_resource(
            resource("medications://history/{patient_name}/{start_date}/{end_date}"),
            echo_handler(),
        );

        assert!(
            registry
                .read_resource("medications://history/John")
                .await
                .is_none()
        );
        assert!(
            registry
                .read_resource("medications://history/John/2025-01-01/2025-02-01")
                .await
                .is_some()
        );
    }
}
