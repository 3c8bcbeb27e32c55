//! HTTP transport for the MCP server.
//!
//! Exposes the same JSON-RPC surface as stdio over `POST /mcp`, for remote
//! agents and API integrations, plus a `/health` probe.

use crate::error::McpError;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::server::McpServer;
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use std::sync::Arc;

/// Create the HTTP router for MCP.
pub fn create_router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp_post))
        .route("/health", get(handle_health))
        .with_state(server)
}

/// Handle POST requests to /mcp (JSON-RPC over HTTP).
async fn handle_mcp_post(
    State(server): State<Arc<McpServer>>,
    Json(request): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    Json(server.handle_request(request).await)
}

/// Handle health check requests.
async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "carebot-mcp",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// HTTP server for MCP transport.
pub struct HttpServer {
    host: String,
    port: u16,
    server: Arc<McpServer>,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(host: String, port: u16, server: Arc<McpServer>) -> Self {
        Self { host, port, server }
    }

    /// Run the HTTP server.
    pub async fn run(self) -> Result<(), McpError> {
        let app = create_router(self.server);
        let addr = format!("{}:{}", self.host, self.port);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| McpError::StartupFailed(format!("Failed to bind to {addr}: {e}")))?;

        tracing::info!(addr = %addr, "MCP HTTP server listening");

        axum::serve(listener, app).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_registry;
    use crate::context::ToolContext;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use carebot_core::{CacheConfig, McpConfig};
    use carebot_dbops::DbOpsClient;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let client = Arc::new(
            DbOpsClient::new("http://localhost:0", Some("t".to_string())).unwrap(),
        );
        let ctx = Arc::new(ToolContext::new(client, &CacheConfig::default()));
        let server = Arc::new(McpServer::new(McpConfig::default(), build_registry(&ctx)));
        create_router(server)
    }

    #[tokio::test]
    async fn health_endpoint_answers_ok() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn mcp_endpoint_speaks_jsonrpc() {
        let body = serde_json::json!({
            "jsonrpc": "2.0", "id": 1, "method": "tools/list"
        });
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/mcp")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(parsed["result"]["tools"].as_array().is_some());
    }
}
