//! ChatRelay - MCP protocol server library
//!
//! This library implements a JSON-RPC 2.0 protocol engine for an AI
//! customer-support assistant, bridging the MCP method catalog to a
//! generative model backend with persisted conversation history.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `protocol`: Envelope codec, classification, and the reserved error codes
//! - `server`: Session negotiation, catalog registries, and method dispatch
//! - `client`: Request correlator and the typed client session
//! - `transport`: WebSocket host and stateless HTTP gateway
//! - `backend`: Model backend trait and the Bedrock HTTP implementation
//! - `storage`: SQLite conversation store
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use chatrelay::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let router = chatrelay::commands::build_router(&config)?;
//!     chatrelay::transport::gateway::serve("127.0.0.1:8080", router).await
//! }
//! ```

pub mod backend;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod transport;

// Re-export commonly used types
pub use client::{McpSession, RpcClient};
pub use config::Config;
pub use error::{ChatRelayError, Result};
pub use protocol::{Envelope, MessageKind, RequestId};
pub use server::{MethodRouter, Session};
pub use storage::{ConversationStore, ConversationTurn};

#[cfg(test)]
pub mod test_utils;
