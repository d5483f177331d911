//! Command-line interface definition for ChatRelay
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the two server surfaces and the interactive
//! chat client.

use clap::{Parser, Subcommand};

/// ChatRelay - MCP protocol server for an AI support assistant
///
/// Hosts the JSON-RPC method catalog over WebSocket or stateless HTTP,
/// bridging chat tool calls to a generative model backend with persisted
/// conversation history.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatrelay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the conversation database path
    #[arg(long, env = "CHATRELAY_HISTORY_DB")]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for ChatRelay
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the persistent WebSocket server
    Serve {
        /// Override the bind address from config (host:port)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Start the stateless HTTP gateway
    Gateway {
        /// Override the bind address from config (host:port)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Start an interactive chat session against a running server
    Chat {
        /// WebSocket URL of the server
        #[arg(short = 'U', long, default_value = "ws://127.0.0.1:8765/ws")]
        url: Option<String>,

        /// User id attached to chat turns
        #[arg(short, long)]
        user: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            storage_path: None,
            command: Commands::Serve { bind: None },
        }
    }
}
