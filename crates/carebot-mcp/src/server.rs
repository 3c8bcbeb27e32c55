//! MCP server implementation.
//!
//! This module provides the main MCP server that handles capability
//! discovery and invocation over JSON-RPC.

use crate::error::McpError;
use crate::http_transport::HttpServer;
use crate::protocol::*;
use crate::registry::CapabilityRegistry;
use carebot_core::{McpConfig, Transport};
use serde_json::{Value, json};
use std::io::{BufRead, Write};
use std::sync::Arc;

/// The MCP server.
pub struct McpServer {
    config: McpConfig,
    registry: CapabilityRegistry,
}

impl McpServer {
    /// Create a new MCP server over an assembled registry.
    pub fn new(config: McpConfig, registry: CapabilityRegistry) -> Self {
        Self { config, registry }
    }

    /// The capability registry.
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Start the MCP server on the configured transport.
    pub async fn run(self: Arc<Self>) -> Result<(), McpError> {
        match self.config.transport {
            Transport::Stdio => self.run_stdio().await,
            Transport::Http => self.run_http().await,
        }
    }

    /// Run the server with stdio transport.
    async fn run_stdio(&self) -> Result<(), McpError> {
        tracing::info!("Starting MCP server with stdio transport");

        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let mut stdout_lock = stdout.lock();

        for line in stdin.lock().lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(request) => request,
                Err(err) => {
                    let response =
                        JsonRpcResponse::error(None, -32700, format!("Parse error: {err}"));
                    writeln!(stdout_lock, "{}", serde_json::to_string(&response)?)?;
                    stdout_lock.flush()?;
                    continue;
                }
            };

            let response = self.handle_request(request).await;
            writeln!(stdout_lock, "{}", serde_json::to_string(&response)?)?;
            stdout_lock.flush()?;
        }

        Ok(())
    }

    /// Run the server with HTTP transport.
    async fn run_http(self: Arc<Self>) -> Result<(), McpError> {
        let host = self.config.host.clone();
        let port = self.config.port;
        HttpServer::new(host, port, self).run().await
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(id),
            methods::INITIALIZED => JsonRpcResponse::success(id, json!({})),
            methods::LIST_TOOLS => self.handle_list_tools(id),
            methods::CALL_TOOL => self.handle_call_tool(id, request.params).await,
            methods::LIST_RESOURCES => self.handle_list_resources(id),
            methods::READ_RESOURCE => self.handle_read_resource(id, request.params).await,
            methods::SHUTDOWN => self.handle_shutdown(id),
            _ => JsonRpcResponse::error(id, -32601, format!("Method not found: {}", request.method)),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": "2024-11-05",
            "serverInfo": {
                "name": "carebot-mcp",
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {},
                "resources": {}
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools = self.registry.tool_definitions();
        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    fn handle_list_resources(&self, id: Option<Value>) -> JsonRpcResponse {
        let resources = self.registry.resource_definitions();
        JsonRpcResponse::success(id, json!({ "resources": resources }))
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, format!("Invalid params: {e}"));
                }
            },
            None => return JsonRpcResponse::error(id, -32602, "Missing params"),
        };

        tracing::debug!(tool = %params.name, "tool call");
        match self.registry.call_tool(&params.name, params.arguments).await {
            Some(text) => {
                let response = CallToolResponse::text(text);
                JsonRpcResponse::success(id, json!(response))
            }
            None => {
                JsonRpcResponse::error(id, -32602, format!("Tool not found: {}", params.name))
            }
        }
    }

    async fn handle_read_resource(
        &self,
        id: Option<Value>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let params: ReadResourceParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, format!("Invalid params: {e}"));
                }
            },
            None => return JsonRpcResponse::error(id, -32602, "Missing params"),
        };

        tracing::debug!(uri = %params.uri, "resource read");
        match self.registry.read_resource(&params.uri).await {
            Some(text) => {
                let response = ReadResourceResponse {
                    contents: vec![ResourceContents {
                        uri: params.uri,
                        text,
                    }],
                };
                JsonRpcResponse::success(id, json!(response))
            }
            None => {
                JsonRpcResponse::error(id, -32602, format!("Unknown resource URI: {}", params.uri))
            }
        }
    }

    fn handle_shutdown(&self, id: Option<Value>) -> JsonRpcResponse {
        tracing::info!("MCP server shutdown requested");
        JsonRpcResponse::success(id, json!(null))
    }
}
