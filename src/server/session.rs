//! Session negotiation state machine
//!
//! One [`Session`] exists per connection on the persistent transport and is
//! synthesized fresh per invocation on the stateless one. The negotiator is
//! unilateral: it records whatever version and capabilities the client
//! declares and always answers with the server's own fixed version and
//! capability set. A version mismatch is the client's problem to detect.

use serde_json::json;

use crate::protocol::types::{
    Implementation, InitializeParams, InitializeResult, PROTOCOL_VERSION, SERVER_NAME,
    SERVER_VERSION,
};

/// Lifecycle of a session.
///
/// `Uninitialized --initialize--> Initializing --initialized--> Ready`.
/// Methods other than `initialize` are permitted in any state; the machine
/// is bookkeeping, not a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Per-connection negotiation state.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    client_info: Option<Implementation>,
    client_protocol_version: Option<String>,
    client_capabilities: Option<serde_json::Value>,
}

impl Session {
    /// Create a session in the `Uninitialized` state.
    pub fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
            client_info: None,
            client_protocol_version: None,
            client_capabilities: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Client identity recorded during `initialize`, if any.
    pub fn client_info(&self) -> Option<&Implementation> {
        self.client_info.as_ref()
    }

    /// The fixed capability set this server advertises.
    pub fn server_capabilities() -> serde_json::Value {
        json!({
            "tools": {},
            "resources": {},
            "prompts": {},
            "experimental": {
                "sampling": true
            }
        })
    }

    /// Handle `initialize`: record the client's declared version and
    /// capabilities, move to `Initializing`, and answer with the server's
    /// fixed version, capabilities, and identity. The declared version is
    /// never rejected.
    pub fn initialize(&mut self, params: InitializeParams) -> InitializeResult {
        let client_name = params
            .client_info
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("unknown");
        let client_version = params
            .client_info
            .as_ref()
            .map(|c| c.version.as_str())
            .unwrap_or("unknown");
        tracing::info!("Initialize request from {client_name} v{client_version}");

        self.client_info = params.client_info;
        self.client_protocol_version = params.protocol_version;
        self.client_capabilities = params.capabilities;
        self.state = SessionState::Initializing;

        InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: Self::server_capabilities(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        }
    }

    /// Handle the `notifications/initialized` notification: complete the
    /// transition to `Ready`. Observed only for bookkeeping; never answered.
    pub fn mark_initialized(&mut self) {
        if self.state == SessionState::Initializing {
            self.state = SessionState::Ready;
            tracing::info!("Client initialization completed");
        } else {
            tracing::debug!(
                "initialized notification in state {:?}; recording anyway",
                self.state
            );
            self.state = SessionState::Ready;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_uninitialized() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(session.client_info().is_none());
    }

    #[test]
    fn test_initialize_moves_to_initializing_and_records_client() {
        let mut session = Session::new();
        let params: InitializeParams = serde_json::from_value(serde_json::json!({
            "protocolVersion": "2024-11-05",
            "capabilities": { "experimental": {} },
            "clientInfo": { "name": "test-client", "version": "0.1.0" }
        }))
        .unwrap();

        let result = session.initialize(params);
        assert_eq!(session.state(), SessionState::Initializing);
        assert_eq!(session.client_info().unwrap().name, "test-client");
        assert_eq!(result.protocol_version, PROTOCOL_VERSION);
        assert_eq!(result.server_info.name, SERVER_NAME);
    }

    #[test]
    fn test_initialize_ignores_version_mismatch() {
        let mut session = Session::new();
        let params: InitializeParams = serde_json::from_value(serde_json::json!({
            "protocolVersion": "1999-01-01"
        }))
        .unwrap();

        // The server always answers with its own fixed version.
        let result = session.initialize(params);
        assert_eq!(result.protocol_version, PROTOCOL_VERSION);
    }

    #[test]
    fn test_initialized_notification_completes_handshake() {
        let mut session = Session::new();
        session.initialize(InitializeParams::default());
        session.mark_initialized();
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_initialized_without_initialize_still_reaches_ready() {
        let mut session = Session::new();
        session.mark_initialized();
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_server_capabilities_advertise_sampling() {
        let caps = Session::server_capabilities();
        assert_eq!(caps["experimental"]["sampling"], true);
        assert!(caps.get("tools").is_some());
        assert!(caps.get("resources").is_some());
        assert!(caps.get("prompts").is_some());
    }
}
