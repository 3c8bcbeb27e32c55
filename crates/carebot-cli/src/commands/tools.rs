//! Tools command: print the assembled capability catalog.

use anyhow::{Context, Result};
use carebot_dbops::DbOpsClient;
use carebot_mcp::{ToolContext, build_registry};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for `carebot tools`.
#[derive(Debug, Args)]
pub struct ToolsArgs {
    /// Configuration file path.
    #[arg(short, long, default_value = "carebot.yaml")]
    pub config: PathBuf,

    /// Show input schemas.
    #[arg(long)]
    pub verbose: bool,
}

pub async fn execute(args: ToolsArgs) -> Result<()> {
    let config = super::load_config(&args.config)?;
    let client = Arc::new(
        DbOpsClient::from_config(&config.backend).context("Failed to create backend client")?,
    );
    let ctx = Arc::new(ToolContext::new(Arc::clone(&client), &config.cache));
    let registry = build_registry(&ctx);

    println!("\nAvailable Tools ({}):", registry.tool_count());
    for tool in registry.tool_definitions() {
        println!("   • {}", tool.name);
        if let Some(description) = &tool.description {
            println!("     {description}");
        }
        if args.verbose {
            println!(
                "     Schema: {}",
                serde_json::to_string_pretty(&tool.input_schema)?
            );
        }
    }

    println!("\nResources ({}):", registry.resource_count());
    for resource in registry.resource_definitions() {
        println!("   • {}", resource.uri_template);
        if let Some(description) = &resource.description {
            println!("     {description}");
        }
    }
    println!();

    client.shutdown();
    Ok(())
}
