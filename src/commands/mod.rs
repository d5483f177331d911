/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `serve`   — Persistent WebSocket server
- `gateway` — Stateless HTTP gateway
- `chat`    — Interactive chat client against a running server

The two server handlers assemble the same protocol engine and differ only
in the transport they mount it on.
*/

pub mod chat;
pub mod gateway;
pub mod serve;

use std::sync::Arc;

use crate::backend::{BedrockBackend, ModelBackend};
use crate::config::Config;
use crate::error::Result;
use crate::server::{MethodRouter, PromptRegistry, ResourceRegistry, ToolRegistry};
use crate::storage::ConversationStore;

/// Assemble the protocol engine from configuration: backend, store, the
/// three registries, and the router that dispatches across them.
pub fn build_router(config: &Config) -> Result<Arc<MethodRouter>> {
    let bedrock = BedrockBackend::new(&config.backend)?;
    let (max_tokens, temperature) = bedrock.defaults();
    let backend: Arc<dyn ModelBackend> = Arc::new(bedrock);
    let store = Arc::new(ConversationStore::new(&config.storage)?);

    let tools = ToolRegistry::new(Arc::clone(&backend), store, max_tokens, temperature);
    let resources = ResourceRegistry::new();
    let prompts = PromptRegistry::new(backend.model_id());

    tracing::info!(
        "Protocol engine ready (model: {}, endpoint: {})",
        backend.model_id(),
        config.backend.endpoint
    );

    Ok(Arc::new(MethodRouter::new(
        tools, resources, prompts, backend,
    )))
}
