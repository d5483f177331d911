//! High-level client session over the correlator
//!
//! Wraps [`RpcClient`] with typed calls for the server's method catalog and
//! performs the initialize handshake. Error responses from the server are
//! surfaced as [`ChatRelayError::Rpc`] carrying the server's message.

use std::time::Duration;

use serde_json::json;

use crate::client::RpcClient;
use crate::error::{ChatRelayError, Result};
use crate::protocol::envelope::Envelope;
use crate::protocol::types::{
    CallToolResult, GetPromptResult, InitializeResult, ListPromptsResult, ListResourcesResult,
    ListToolsResult, ReadResourceResult, SamplingResult, METHOD_INITIALIZE, METHOD_PROMPTS_GET,
    METHOD_PROMPTS_LIST, METHOD_RESOURCES_LIST, METHOD_RESOURCES_READ,
    METHOD_SAMPLING_CREATE_MESSAGE, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST, NOTIF_INITIALIZED,
    PROTOCOL_VERSION,
};

/// A negotiated client session.
pub struct McpSession {
    client: RpcClient,
    timeout: Option<Duration>,
}

impl McpSession {
    /// Wrap a correlator. [`McpSession::initialize`] must run before the
    /// typed calls are meaningful to a conforming server.
    pub fn new(client: RpcClient) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Override the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let reply = self.client.request(method, params, self.timeout).await?;
        Self::into_result(reply)
    }

    fn into_result(reply: Envelope) -> Result<serde_json::Value> {
        if let Some(error) = reply.error {
            return Err(ChatRelayError::Rpc(error.message).into());
        }
        reply
            .result
            .ok_or_else(|| ChatRelayError::Rpc("response carried no result".to_string()).into())
    }

    /// Perform the initialize handshake and send `notifications/initialized`.
    pub async fn initialize(&self) -> Result<InitializeResult> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": "chatrelay-client",
                "version": env!("CARGO_PKG_VERSION"),
            }
        });
        let result = self.call(METHOD_INITIALIZE, params).await?;
        let parsed: InitializeResult = serde_json::from_value(result)?;

        self.client.notify(NOTIF_INITIALIZED, json!({}))?;
        Ok(parsed)
    }

    /// List the server's tool catalog.
    pub async fn list_tools(&self) -> Result<ListToolsResult> {
        let result = self.call(METHOD_TOOLS_LIST, json!({})).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Invoke a tool by name.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult> {
        let params = json!({ "name": name, "arguments": arguments });
        let result = self.call(METHOD_TOOLS_CALL, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Send one chat message and decode the tool's JSON payload out of the
    /// text content block.
    pub async fn chat(
        &self,
        message: &str,
        conversation_id: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<serde_json::Value> {
        let mut arguments = json!({ "message": message });
        if let Some(cid) = conversation_id {
            arguments["conversation_id"] = json!(cid);
        }
        if let Some(uid) = user_id {
            arguments["user_id"] = json!(uid);
        }

        let result = self.call_tool(crate::server::registry::TOOL_CHAT, arguments).await?;
        Self::decode_text_payload(&result)
    }

    /// Fetch the stored history for a conversation.
    pub async fn get_history(&self, conversation_id: &str) -> Result<serde_json::Value> {
        let result = self
            .call_tool(
                crate::server::registry::TOOL_HISTORY,
                json!({ "conversation_id": conversation_id }),
            )
            .await?;
        Self::decode_text_payload(&result)
    }

    fn decode_text_payload(result: &CallToolResult) -> Result<serde_json::Value> {
        let block = result
            .content
            .first()
            .ok_or_else(|| ChatRelayError::Rpc("tool result had no content".to_string()))?;
        Ok(serde_json::from_str(&block.text)?)
    }

    /// List the server's resource catalog.
    pub async fn list_resources(&self) -> Result<ListResourcesResult> {
        let result = self.call(METHOD_RESOURCES_LIST, json!({})).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Read a resource by URI.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult> {
        let result = self
            .call(METHOD_RESOURCES_READ, json!({ "uri": uri }))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// List the server's prompt catalog.
    pub async fn list_prompts(&self) -> Result<ListPromptsResult> {
        let result = self.call(METHOD_PROMPTS_LIST, json!({})).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Render a prompt template.
    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<GetPromptResult> {
        let params = json!({ "name": name, "arguments": arguments });
        let result = self.call(METHOD_PROMPTS_GET, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Ask the server to sample a completion for a message list.
    pub async fn create_message(
        &self,
        messages: serde_json::Value,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<SamplingResult> {
        let mut params = json!({ "messages": messages });
        if let Some(mt) = max_tokens {
            params["maxTokens"] = json!(mt);
        }
        if let Some(t) = temperature {
            params["temperature"] = json!(t);
        }
        let result = self.call(METHOD_SAMPLING_CREATE_MESSAGE, params).await?;
        Ok(serde_json::from_value(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::envelope::RequestId;
    use crate::protocol::errors::ProtocolError;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    /// Responder answering every request with a fixed result or error.
    fn spawn_responder(
        mut wire_rx: mpsc::UnboundedReceiver<String>,
        reply_tx: mpsc::UnboundedSender<String>,
        reply: std::result::Result<serde_json::Value, ProtocolError>,
    ) {
        tokio::spawn(async move {
            while let Some(raw) = wire_rx.recv().await {
                let env = Envelope::parse(&raw).unwrap();
                let Some(id) = env.id else { continue };
                let out = match &reply {
                    Ok(result) => Envelope::response(id, result.clone()),
                    Err(err) => Envelope::error_response(id, err.to_error_object()),
                };
                let _ = reply_tx.send(out.to_json().unwrap());
            }
        });
    }

    fn make_session(
        reply: std::result::Result<serde_json::Value, ProtocolError>,
    ) -> (McpSession, CancellationToken) {
        let (wire_tx, wire_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let client = RpcClient::new(wire_tx);
        let cancel = CancellationToken::new();
        crate::client::start_read_loop(reply_rx, cancel.clone(), client.clone_shared());
        spawn_responder(wire_rx, reply_tx, reply);
        (
            McpSession::new(client).with_timeout(Duration::from_secs(1)),
            cancel,
        )
    }

    #[tokio::test]
    async fn test_error_response_surfaces_as_rpc_error() {
        let (session, cancel) = make_session(Err(ProtocolError::MethodNotFound(
            "tools/list".to_string(),
        )));

        let err = session.list_tools().await.expect_err("expected rpc error");
        let err = err.downcast::<ChatRelayError>().expect("typed error");
        match err {
            ChatRelayError::Rpc(msg) => assert!(msg.contains("tools/list")),
            other => panic!("unexpected error: {other}"),
        }
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_chat_decodes_inner_json_payload() {
        let inner = json!({ "response": "hello", "conversation_id": "c1" });
        let reply = json!({
            "content": [{ "type": "text", "text": serde_json::to_string_pretty(&inner).unwrap() }]
        });
        let (session, cancel) = make_session(Ok(reply));

        let payload = session.chat("hi", Some("c1"), None).await.unwrap();
        assert_eq!(payload["response"], "hello");
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_list_tools_parses_catalog() {
        let reply = json!({
            "tools": [
                { "name": "chat_with_ai", "description": "d", "inputSchema": {} }
            ]
        });
        let (session, cancel) = make_session(Ok(reply));

        let tools = session.list_tools().await.unwrap();
        assert_eq!(tools.tools.len(), 1);
        assert_eq!(tools.tools[0].name, "chat_with_ai");
        cancel.cancel();
    }

    #[tokio::test]
    async fn test_response_without_result_is_an_error() {
        let env = Envelope {
            jsonrpc: "2.0".to_string(),
            id: Some(RequestId::Number(1)),
            method: None,
            params: None,
            result: None,
            error: None,
        };
        assert!(McpSession::into_result(env).is_err());
    }
}
