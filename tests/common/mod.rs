use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use chatrelay::backend::{ChatMessage, ModelBackend};
use chatrelay::server::{MethodRouter, PromptRegistry, ResourceRegistry, ToolRegistry};
use chatrelay::storage::ConversationStore;

/// Backend returning a fixed reply for every invocation.
pub struct CannedBackend {
    reply: String,
}

#[allow(dead_code)]
impl CannedBackend {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl ModelBackend for CannedBackend {
    fn model_id(&self) -> &str {
        "mock-model"
    }

    async fn invoke(&self, _messages: &[ChatMessage], _max_tokens: u32, _temperature: f32) -> String {
        self.reply.clone()
    }
}

/// Assemble a full protocol engine over a temp-directory store.
///
/// Returns the `TempDir` so the caller keeps the database alive.
#[allow(dead_code)]
pub fn build_router(reply: &str) -> (Arc<MethodRouter>, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = Arc::new(
        ConversationStore::new_with_path(tmp.path().join("history.db"))
            .expect("failed to create store"),
    );
    let backend: Arc<dyn ModelBackend> = Arc::new(CannedBackend::new(reply));

    let router = MethodRouter::new(
        ToolRegistry::new(Arc::clone(&backend), store, 500, 0.7),
        ResourceRegistry::new(),
        PromptRegistry::new(backend.model_id()),
        backend,
    );
    (Arc::new(router), tmp)
}
