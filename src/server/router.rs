//! Method dispatch and the error-mapping boundary
//!
//! The router is the single protocol core shared by both hosting roles; the
//! stateless gateway and the persistent connection host differ only in how
//! they wire envelopes in and out. Every handler fault is converted to an
//! error Response here, and nowhere else. Notifications never produce a
//! Response, including on failure.

use std::sync::Arc;

use serde_json::json;

use crate::backend::{ChatMessage, ModelBackend};
use crate::error::Result;
use crate::protocol::envelope::{peek_id, Envelope, MessageKind, RequestId};
use crate::protocol::errors::ProtocolError;
use crate::protocol::types::{
    CallToolParams, ContentBlock, GetPromptParams, InitializeParams, ReadResourceParams,
    SamplingMessage, SamplingParams, SamplingResult, METHOD_INITIALIZE, METHOD_PROMPTS_GET,
    METHOD_PROMPTS_LIST, METHOD_RESOURCES_LIST, METHOD_RESOURCES_READ,
    METHOD_SAMPLING_CREATE_MESSAGE, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST, NOTIF_INITIALIZED,
};
use crate::server::registry::{PromptRegistry, ResourceRegistry, ToolRegistry};
use crate::server::session::Session;

/// Routes classified envelopes to the negotiator, a registry operation, or
/// the sampling handler.
pub struct MethodRouter {
    tools: ToolRegistry,
    resources: ResourceRegistry,
    prompts: PromptRegistry,
    backend: Arc<dyn ModelBackend>,
}

impl MethodRouter {
    /// Assemble the router from its immutable parts.
    pub fn new(
        tools: ToolRegistry,
        resources: ResourceRegistry,
        prompts: PromptRegistry,
        backend: Arc<dyn ModelBackend>,
    ) -> Self {
        Self {
            tools,
            resources,
            prompts,
            backend,
        }
    }

    /// Process one raw inbound payload and produce the raw outbound payload,
    /// if any. Notifications and inbound Responses yield `None`.
    ///
    /// # Errors
    ///
    /// Only serialization of an outbound envelope can fail here; every
    /// protocol-level fault is already formatted into the reply.
    pub async fn handle_raw(&self, raw: &str, session: &mut Session) -> Result<Option<String>> {
        let envelope = match Envelope::parse(raw) {
            Ok(env) => env,
            Err(err) => {
                // Echo the id when it survived the failed parse; otherwise
                // answer with an explicit null id.
                let id = peek_id(raw).unwrap_or(RequestId::Null);
                let reply = Envelope::error_response(id, err.to_error_object());
                return Ok(Some(reply.to_json()?));
            }
        };

        match self.dispatch(envelope, session).await {
            Some(reply) => Ok(Some(reply.to_json()?)),
            None => Ok(None),
        }
    }

    /// Classify and dispatch one envelope.
    ///
    /// Requests always yield a Response (success or error) echoing the
    /// request id with its exact type. Notifications and inbound Responses
    /// yield nothing; the latter are logged and discarded, since the server
    /// never issues requests of its own.
    pub async fn dispatch(&self, envelope: Envelope, session: &mut Session) -> Option<Envelope> {
        let kind = match envelope.classify() {
            Ok(kind) => kind,
            Err(err) => {
                let id = envelope.id.clone().unwrap_or(RequestId::Null);
                return Some(Envelope::error_response(id, err.to_error_object()));
            }
        };

        match kind {
            MessageKind::Request => {
                let id = envelope.id.clone().unwrap_or(RequestId::Null);
                let method = envelope.method.clone().unwrap_or_default();
                let params = envelope.params.unwrap_or_else(|| json!({}));

                tracing::info!("Processing method: {method}");

                match self.handle_request(&method, &params, session).await {
                    Ok(result) => Some(Envelope::response(id, result)),
                    Err(err) => {
                        tracing::warn!("Method {method} failed: {err}");
                        Some(Envelope::error_response(id, err.to_error_object()))
                    }
                }
            }
            MessageKind::Notification => {
                let method = envelope.method.clone().unwrap_or_default();
                self.handle_notification(&method, session);
                None
            }
            MessageKind::Response => {
                tracing::debug!(
                    "Discarding inbound response for id {:?}; this side issues no requests",
                    envelope.id
                );
                None
            }
        }
    }

    async fn handle_request(
        &self,
        method: &str,
        params: &serde_json::Value,
        session: &mut Session,
    ) -> std::result::Result<serde_json::Value, ProtocolError> {
        match method {
            METHOD_INITIALIZE => {
                let parsed: InitializeParams = serde_json::from_value(params.clone())
                    .map_err(|e| ProtocolError::InvalidParams(e.to_string()))?;
                let result = session.initialize(parsed);
                serde_json::to_value(result).map_err(|e| ProtocolError::Internal(e.to_string()))
            }
            METHOD_TOOLS_LIST => Ok(json!({ "tools": self.tools.list() })),
            METHOD_TOOLS_CALL => {
                let parsed: CallToolParams = serde_json::from_value(params.clone())
                    .map_err(|e| ProtocolError::InvalidParams(e.to_string()))?;
                let arguments = parsed.arguments.unwrap_or_else(|| json!({}));
                let result = self.tools.call(&parsed.name, &arguments).await?;
                serde_json::to_value(result).map_err(|e| ProtocolError::Internal(e.to_string()))
            }
            METHOD_RESOURCES_LIST => Ok(json!({ "resources": self.resources.list() })),
            METHOD_RESOURCES_READ => {
                let parsed: ReadResourceParams = serde_json::from_value(params.clone())
                    .map_err(|e| ProtocolError::InvalidParams(e.to_string()))?;
                let result = self.resources.read(&parsed.uri)?;
                serde_json::to_value(result).map_err(|e| ProtocolError::Internal(e.to_string()))
            }
            METHOD_PROMPTS_LIST => Ok(json!({ "prompts": self.prompts.list() })),
            METHOD_PROMPTS_GET => {
                let parsed: GetPromptParams = serde_json::from_value(params.clone())
                    .map_err(|e| ProtocolError::InvalidParams(e.to_string()))?;
                let arguments = parsed.arguments.unwrap_or_else(|| json!({}));
                let result = self.prompts.get(&parsed.name, &arguments)?;
                serde_json::to_value(result).map_err(|e| ProtocolError::Internal(e.to_string()))
            }
            METHOD_SAMPLING_CREATE_MESSAGE => self.sampling(params).await,
            other => Err(ProtocolError::MethodNotFound(other.to_string())),
        }
    }

    fn handle_notification(&self, method: &str, session: &mut Session) {
        match method {
            NOTIF_INITIALIZED => session.mark_initialized(),
            other => tracing::debug!("Ignoring notification: {other}"),
        }
    }

    /// `sampling/createMessage`: forward the most recent user message to the
    /// backend with no conversation-history context.
    async fn sampling(
        &self,
        params: &serde_json::Value,
    ) -> std::result::Result<serde_json::Value, ProtocolError> {
        let parsed: SamplingParams = serde_json::from_value(params.clone())
            .map_err(|e| ProtocolError::InvalidParams(e.to_string()))?;

        let user_message = extract_last_user_message(&parsed.messages).ok_or_else(|| {
            ProtocolError::Internal("No user message found in sampling request".to_string())
        })?;

        let text = self
            .backend
            .invoke(
                &[ChatMessage::user(user_message)],
                parsed.max_tokens,
                parsed.temperature,
            )
            .await;

        let result = SamplingResult {
            role: "assistant".to_string(),
            content: ContentBlock::text(text),
            model: self.backend.model_id().to_string(),
            stop_reason: "endTurn".to_string(),
        };
        serde_json::to_value(result).map_err(|e| ProtocolError::Internal(e.to_string()))
    }
}

/// Scan from the end for the most recent user-role message and pull out its
/// text. Content may be a list of text blocks or a plain string; the scan
/// stops at the first user message regardless of whether text was found,
/// matching the dispatch contract.
fn extract_last_user_message(messages: &[SamplingMessage]) -> Option<String> {
    for msg in messages.iter().rev() {
        if msg.role != "user" {
            continue;
        }

        let text = if let Some(blocks) = msg.content.as_array() {
            blocks
                .iter()
                .find(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
                .and_then(|b| b.get("text"))
                .and_then(|t| t.as_str())
                .map(str::to_string)
        } else {
            msg.content.as_str().map(str::to_string)
        };

        return text.filter(|t| !t.is_empty());
    }
    None
}
