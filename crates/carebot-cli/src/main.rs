//! CareBot CLI: runs the MCP server and inspects its capability catalog.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "carebot", version, about = "CareBot MCP server")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the MCP server.
    Serve(commands::serve::ServeArgs),

    /// List the registered tools and resources.
    Tools(commands::tools::ToolsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The backend URL and token conventionally live in a .env file.
    dotenvy::dotenv().ok();
    // Logs go to stderr; stdout belongs to the stdio transport.
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => commands::serve::execute(args).await,
        Command::Tools(args) => commands::tools::execute(args).await,
    }
}
