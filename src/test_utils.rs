//! Shared test helpers

use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::{ChatMessage, ModelBackend};

/// Canned-response model backend that records every prompt it receives.
pub struct MockBackend {
    model: String,
    reply: String,
    /// Every prompt sequence passed to `invoke`, in call order.
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockBackend {
    /// Backend with model id `mock-model` and a fixed reply.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            model: "mock-model".to_string(),
            reply: reply.into(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn invoke(
        &self,
        messages: &[ChatMessage],
        _max_tokens: u32,
        _temperature: f32,
    ) -> String {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.reply.clone()
    }
}
