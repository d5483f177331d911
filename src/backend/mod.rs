//! Model backend abstraction
//!
//! The protocol engine never talks to a model API directly; it goes through
//! the [`ModelBackend`] trait. The contract is deliberately soft: `invoke`
//! always returns text, and any fault is converted into a user-facing
//! apology string by the implementation so a conversational flow is never
//! interrupted by a protocol error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod bedrock;

pub use bedrock::BedrockBackend;

/// One message in a model prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// "system", "user", or "assistant".
    pub role: String,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// Abstraction over generative-model invocation.
///
/// Implementations must normalize whatever response shape the underlying
/// model emits down to plain text, and must not fail: transport faults and
/// unrecognized shapes become apology strings, never errors.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Identifier of the underlying model, reported in tool results and
    /// sampling responses.
    fn model_id(&self) -> &str;

    /// Invoke the model with a prompt message sequence and return its text.
    async fn invoke(&self, messages: &[ChatMessage], max_tokens: u32, temperature: f32) -> String;
}
