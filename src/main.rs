//! ChatRelay - MCP protocol server CLI
//!
#![doc = "ChatRelay - MCP protocol server CLI"]
#![doc = "Main entry point for the ChatRelay server and chat client."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatrelay::cli::{Cli, Commands};
use chatrelay::commands;
use chatrelay::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // If the user supplied a storage path on the CLI (or via env), mirror it
    // into CHATRELAY_HISTORY_DB so the storage initializer picks it up.
    if let Some(db_path) = &cli.storage_path {
        std::env::set_var("CHATRELAY_HISTORY_DB", db_path);
        tracing::info!("Using storage DB override from CLI: {}", db_path);
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Serve { bind } => {
            tracing::info!("Starting WebSocket server");
            commands::serve::run_serve(config, bind).await
        }
        Commands::Gateway { bind } => {
            tracing::info!("Starting HTTP gateway");
            commands::gateway::run_gateway(config, bind).await
        }
        Commands::Chat { url, user } => {
            tracing::info!("Starting interactive chat client");
            commands::chat::run_chat(url, user).await
        }
    }
}

/// Initialize the tracing subscriber with an env-filterable format layer.
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chatrelay=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
