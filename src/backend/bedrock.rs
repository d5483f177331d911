//! Bedrock-style HTTP model backend
//!
//! Invokes a model runtime over `POST {endpoint}/model/{model_id}/invoke`
//! and normalizes the response down to plain text. Three response-shape
//! conventions are recognized; anything else, and any transport fault,
//! degrades to an apology string per the soft-failure contract.

use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{ChatMessage, ModelBackend};
use crate::config::BackendConfig;
use crate::error::Result;

/// HTTP backend for Bedrock-compatible model runtimes.
#[derive(Debug, Clone)]
pub struct BedrockBackend {
    client: reqwest::Client,
    endpoint: String,
    model_id: String,
    max_tokens: u32,
    temperature: f32,
}

impl BedrockBackend {
    /// Create a backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("chatrelay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model_id: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Defaults configured for this backend, used when a caller does not
    /// supply its own budget.
    pub fn defaults(&self) -> (u32, f32) {
        (self.max_tokens, self.temperature)
    }

    fn invoke_url(&self) -> String {
        format!("{}/model/{}/invoke", self.endpoint, self.model_id)
    }
}

/// Extract the generated text from a model response body.
///
/// Recognized shapes, tried in order:
/// - Nova: `output.message.content[0].text`
/// - Claude: `content[0].text`, or `content` as a plain string
/// - Legacy: `completion`
pub fn normalize_response(body: &serde_json::Value) -> Option<String> {
    if let Some(text) = body
        .get("output")
        .and_then(|o| o.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(|t| t.as_str())
    {
        return Some(text.to_string());
    }

    if let Some(content) = body.get("content") {
        if let Some(text) = content
            .get(0)
            .and_then(|b| b.get("text"))
            .and_then(|t| t.as_str())
        {
            return Some(text.to_string());
        }
        if let Some(text) = content.as_str() {
            return Some(text.to_string());
        }
    }

    if let Some(text) = body.get("completion").and_then(|t| t.as_str()) {
        return Some(text.to_string());
    }

    None
}

#[async_trait]
impl ModelBackend for BedrockBackend {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn invoke(&self, messages: &[ChatMessage], max_tokens: u32, temperature: f32) -> String {
        // The runtime's message API takes a single user turn; the prompt
        // sequence is already flattened so the final message carries it.
        let prompt = messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        let request_body = serde_json::json!({
            "inferenceConfig": {
                "max_new_tokens": max_tokens,
                "temperature": temperature
            },
            "messages": [
                {
                    "role": "user",
                    "content": [{ "text": prompt }]
                }
            ]
        });

        tracing::info!("Calling model backend: {}", self.model_id);

        let response = match self
            .client
            .post(self.invoke_url())
            .json(&request_body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Error calling model {}: {e}", self.model_id);
                return format!(
                    "I apologize, but I encountered an error while processing your request: {e}"
                );
            }
        };

        let body: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("Error reading model response from {}: {e}", self.model_id);
                return format!(
                    "I apologize, but I encountered an error while processing your request: {e}"
                );
            }
        };

        match normalize_response(&body) {
            Some(text) => text,
            None => {
                tracing::error!("Unexpected response format from {}: {body}", self.model_id);
                "I apologize, but I received an unexpected response format. Please try again."
                    .to_string()
            }
        }
    }
}
