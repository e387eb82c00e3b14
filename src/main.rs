mod cli;
mod server;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use carekg::config::CarekgConfig;

#[derive(Parser)]
#[command(name = "carekg", version, about = "Knowledge-graph retrieval for a dementia-care agent")]
struct Cli {
    /// Config file (defaults to ~/.carekg/config.toml)
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (stdio transport)
    Serve,
    #[command(flatten)]
    OneShot(cli::Command),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CarekgConfig::load_from(path)?,
        None => CarekgConfig::load()?,
    };

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            server::serve_stdio(config).await?;
        }
        Command::OneShot(command) => {
            tokio::task::spawn_blocking(move || cli::run(command, &config)).await??;
        }
    }

    Ok(())
}
