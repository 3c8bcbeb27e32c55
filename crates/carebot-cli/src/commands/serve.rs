//! Serve command: build the client, directory, and registry, then run the
//! MCP server on the chosen transport.

use anyhow::{Context, Result};
use carebot_core::Transport;
use carebot_dbops::DbOpsClient;
use carebot_mcp::{McpServer, ToolContext, build_registry};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Arguments for `carebot serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Configuration file path.
    #[arg(short, long, default_value = "carebot.yaml")]
    pub config: PathBuf,

    /// Transport type (stdio or http). Overrides the config file.
    #[arg(long)]
    pub transport: Option<String>,

    /// HTTP port (only for http transport). Overrides the config file.
    #[arg(long)]
    pub port: Option<u16>,
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let mut config = super::load_config(&args.config)?;

    // CLI flags override the config file.
    if let Some(transport) = &args.transport {
        config.mcp.transport = match transport.as_str() {
            "stdio" => Transport::Stdio,
            "http" => Transport::Http,
            other => anyhow::bail!("Unknown transport: {other}. Use 'stdio' or 'http'"),
        };
    }
    if let Some(port) = args.port {
        config.mcp.port = port;
    }

    let client = Arc::new(
        DbOpsClient::from_config(&config.backend).context("Failed to create backend client")?,
    );
    let ctx = Arc::new(ToolContext::new(Arc::clone(&client), &config.cache));
    let registry = build_registry(&ctx);

    info!(
        backend = %config.backend.base_url,
        transport = ?config.mcp.transport,
        tools = registry.tool_count(),
        resources = registry.resource_count(),
        "MCP server starting"
    );

    let server = Arc::new(McpServer::new(config.mcp.clone(), registry));
    let result = server.run().await;

    // One shared pool for the process lifetime, closed exactly once on exit.
    client.shutdown();

    result.context("MCP server exited with an error")
}
