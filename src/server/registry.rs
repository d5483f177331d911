//! Capability registries: tools, resources, and prompts
//!
//! All three catalogs are immutable after construction. They are built once
//! at process start and handed to the router explicitly; no entry is added,
//! removed, or mutated at runtime. The tool registry is the only one with
//! side effects, since it bridges to the model backend and the conversation
//! store.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::backend::{ChatMessage, ModelBackend};
use crate::protocol::errors::ProtocolError;
use crate::protocol::types::{
    CallToolResult, ContentBlock, GetPromptResult, PromptArgument, PromptDescriptor,
    PromptMessage, ReadResourceResult, ResourceContents, ResourceDescriptor, ToolDescriptor,
};
use crate::storage::{ConversationStore, ConversationTurn};

/// Primary chat tool name.
pub const TOOL_CHAT: &str = "chat_with_ai";
/// Backward-compatible alias; dispatches identically to [`TOOL_CHAT`].
pub const TOOL_CHAT_ALIAS: &str = "chat_with_nova";
/// History retrieval tool name.
pub const TOOL_HISTORY: &str = "get_conversation_history";

/// The single static resource URI.
pub const RESOURCE_HISTORY_URI: &str = "conversation://history";

/// The single prompt template name.
pub const PROMPT_CUSTOMER_SUPPORT: &str = "customer_support";

/// Number of history turns included when building the model prompt.
const HISTORY_CONTEXT_TURNS: usize = 10;

/// Build the prompt message sequence for a chat invocation: system prompt,
/// the most recent history turns as user/assistant pairs, then the current
/// message.
pub fn build_conversation_context(
    model_id: &str,
    current_message: &str,
    history: &[ConversationTurn],
) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(format!(
        "You are a helpful customer support assistant powered by {model_id}. \
         You provide accurate, helpful, and empathetic responses to customer inquiries. \
         Use the conversation history to maintain context and provide personalized assistance."
    ))];

    let start = history.len().saturating_sub(HISTORY_CONTEXT_TURNS);
    for turn in &history[start..] {
        messages.push(ChatMessage::user(turn.query.clone()));
        messages.push(ChatMessage::assistant(turn.response.clone()));
    }

    messages.push(ChatMessage::user(current_message));
    messages
}

/// The invocable tool catalog.
pub struct ToolRegistry {
    backend: Arc<dyn ModelBackend>,
    store: Arc<ConversationStore>,
    max_tokens: u32,
    temperature: f32,
}

impl ToolRegistry {
    /// Build the registry around its collaborators.
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        store: Arc<ConversationStore>,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            backend,
            store,
            max_tokens,
            temperature,
        }
    }

    /// The two catalog entries, in declaration order.
    pub fn list(&self) -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor {
                name: TOOL_CHAT.to_string(),
                description: format!(
                    "Chat with {} AI assistant for customer support",
                    self.backend.model_id()
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "message": {
                            "type": "string",
                            "description": "The user's message"
                        },
                        "conversation_id": {
                            "type": "string",
                            "description": "Conversation ID for context tracking"
                        },
                        "user_id": {
                            "type": "string",
                            "description": "User identifier"
                        }
                    },
                    "required": ["message"]
                }),
            },
            ToolDescriptor {
                name: TOOL_HISTORY.to_string(),
                description: "Retrieve conversation history for a given conversation ID"
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "conversation_id": {
                            "type": "string",
                            "description": "Conversation ID to retrieve history for"
                        }
                    },
                    "required": ["conversation_id"]
                }),
            },
        ]
    }

    /// Invoke a tool by name.
    ///
    /// The result payload is JSON serialized into the text of a single
    /// content block, per the tool-call wire contract.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidRequest`] for an unknown tool name
    /// and [`ProtocolError::InvalidParams`] for a missing required argument.
    pub async fn call(
        &self,
        name: &str,
        arguments: &serde_json::Value,
    ) -> Result<CallToolResult, ProtocolError> {
        let payload = match name {
            TOOL_CHAT | TOOL_CHAT_ALIAS => self.chat(arguments).await,
            TOOL_HISTORY => self.history(arguments)?,
            _ => {
                return Err(ProtocolError::InvalidRequest(format!(
                    "Unknown tool: {name}"
                )))
            }
        };

        let text = serde_json::to_string_pretty(&payload)
            .map_err(|e| ProtocolError::Internal(e.to_string()))?;

        Ok(CallToolResult {
            content: vec![ContentBlock::text(text)],
        })
    }

    /// Chat tool: query history, invoke the model, persist the turn.
    ///
    /// Backend faults never surface here; the backend's soft-failure
    /// contract turns them into apology text inside the response.
    async fn chat(&self, arguments: &serde_json::Value) -> serde_json::Value {
        let message = arguments
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let conversation_id = arguments
            .get("conversation_id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let user_id = arguments
            .get("user_id")
            .and_then(|v| v.as_str())
            .unwrap_or("anonymous");

        let history = self.store.query_history(&conversation_id);
        let context = build_conversation_context(self.backend.model_id(), message, &history);
        let response_text = self
            .backend
            .invoke(&context, self.max_tokens, self.temperature)
            .await;

        self.store.append(&ConversationTurn::new(
            conversation_id.clone(),
            user_id,
            message,
            response_text.clone(),
        ));

        json!({
            "conversation_id": conversation_id,
            "user_id": user_id,
            "response": response_text,
            "timestamp": Utc::now().to_rfc3339(),
            "context": {
                "conversation_length": history.len() + 1,
                "model": self.backend.model_id()
            }
        })
    }

    /// History tool: the ordered turn history plus retrieval metadata.
    fn history(&self, arguments: &serde_json::Value) -> Result<serde_json::Value, ProtocolError> {
        let conversation_id = arguments
            .get("conversation_id")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ProtocolError::InvalidParams("conversation_id is required".to_string())
            })?;

        let history = self.store.query_history(conversation_id);

        Ok(json!({
            "conversation_id": conversation_id,
            "history": history,
            "total_exchanges": history.len(),
            "retrieved_at": Utc::now().to_rfc3339()
        }))
    }
}

/// The readable resource catalog.
pub struct ResourceRegistry;

impl ResourceRegistry {
    pub fn new() -> Self {
        Self
    }

    /// The single catalog entry.
    pub fn list(&self) -> Vec<ResourceDescriptor> {
        vec![ResourceDescriptor {
            uri: RESOURCE_HISTORY_URI.to_string(),
            name: "Conversation History".to_string(),
            description: "Access to conversation history data".to_string(),
            mime_type: "application/json".to_string(),
        }]
    }

    /// Read a resource by URI. The history resource returns a fixed
    /// informational payload, not live data.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidRequest`] for any other URI.
    pub fn read(&self, uri: &str) -> Result<ReadResourceResult, ProtocolError> {
        if uri != RESOURCE_HISTORY_URI {
            return Err(ProtocolError::InvalidRequest(format!(
                "Unknown resource: {uri}"
            )));
        }

        let payload = json!({
            "conversations": "Access conversation history via get_conversation_history tool",
            "available_methods": [
                "Use chat_with_nova tool to start new conversations",
                "Use get_conversation_history tool to retrieve specific conversation"
            ]
        });

        let text = serde_json::to_string_pretty(&payload)
            .map_err(|e| ProtocolError::Internal(e.to_string()))?;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: uri.to_string(),
                mime_type: "application/json".to_string(),
                text,
            }],
        })
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The prompt template catalog.
pub struct PromptRegistry {
    model_id: String,
}

impl PromptRegistry {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
        }
    }

    /// The single catalog entry.
    pub fn list(&self) -> Vec<PromptDescriptor> {
        vec![PromptDescriptor {
            name: PROMPT_CUSTOMER_SUPPORT.to_string(),
            description: "Customer support conversation prompt".to_string(),
            arguments: vec![
                PromptArgument {
                    name: "customer_issue".to_string(),
                    description: "Description of the customer's issue".to_string(),
                    required: true,
                },
                PromptArgument {
                    name: "urgency".to_string(),
                    description: "Urgency level (low, medium, high)".to_string(),
                    required: false,
                },
            ],
        }]
    }

    /// Render a prompt template. Pure string substitution, no side effects.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidRequest`] for an unknown prompt name
    /// and [`ProtocolError::InvalidParams`] when `customer_issue` is absent.
    pub fn get(
        &self,
        name: &str,
        arguments: &serde_json::Value,
    ) -> Result<GetPromptResult, ProtocolError> {
        if name != PROMPT_CUSTOMER_SUPPORT {
            return Err(ProtocolError::InvalidRequest(format!(
                "Unknown prompt: {name}"
            )));
        }

        let customer_issue = arguments
            .get("customer_issue")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ProtocolError::InvalidParams("customer_issue is required".to_string())
            })?;
        let urgency = arguments
            .get("urgency")
            .and_then(|v| v.as_str())
            .unwrap_or("medium");

        let prompt_text = format!(
            "You are a helpful customer support assistant powered by {}.\n\n\
             Customer Issue: {customer_issue}\n\
             Urgency Level: {urgency}\n\n\
             Please provide a helpful, empathetic, and professional response to address \
             the customer's concern. Consider the urgency level in your response tone \
             and suggested next steps.",
            self.model_id
        );

        Ok(GetPromptResult {
            description: "Customer support prompt".to_string(),
            messages: vec![PromptMessage {
                role: "user".to_string(),
                content: ContentBlock::text(prompt_text),
            }],
        })
    }
}
