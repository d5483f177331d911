//! Error types for ChatRelay
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling. Protocol-level errors
//! (the reserved JSON-RPC codes) live in [`crate::protocol::errors`]; the
//! types here cover the host process: configuration, transports, storage,
//! and the model backend.

use thiserror::Error;

/// Main error type for ChatRelay operations
///
/// This enum encompasses all possible errors that can occur while loading
/// configuration, driving a transport, correlating requests, or talking to
/// the model backend and conversation store.
#[derive(Error, Debug)]
pub enum ChatRelayError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model backend errors (HTTP faults, unusable endpoint)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Conversation storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Transport-level errors (closed channels, socket failures)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A JSON-RPC error response returned by the remote peer
    #[error("RPC error: {0}")]
    Rpc(String),

    /// A request did not receive a response within its deadline
    #[error("Request timed out: method={method}")]
    Timeout {
        /// The method name of the timed-out request
        method: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for ChatRelay operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ChatRelayError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_backend_error_display() {
        let error = ChatRelayError::Backend("endpoint unreachable".to_string());
        assert_eq!(error.to_string(), "Backend error: endpoint unreachable");
    }

    #[test]
    fn test_storage_error_display() {
        let error = ChatRelayError::Storage("database connection failed".to_string());
        assert_eq!(
            error.to_string(),
            "Storage error: database connection failed"
        );
    }

    #[test]
    fn test_transport_error_display() {
        let error = ChatRelayError::Transport("outbound channel closed".to_string());
        assert_eq!(
            error.to_string(),
            "Transport error: outbound channel closed"
        );
    }

    #[test]
    fn test_timeout_error_display() {
        let error = ChatRelayError::Timeout {
            method: "tools/call".to_string(),
        };
        assert!(error.to_string().contains("tools/call"));
        assert!(error.to_string().contains("timed out"));
    }

    #[test]
    fn test_rpc_error_display() {
        let error = ChatRelayError::Rpc("Method not found: foo/bar".to_string());
        assert_eq!(error.to_string(), "RPC error: Method not found: foo/bar");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ChatRelayError = io_error.into();
        assert!(matches!(error, ChatRelayError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: ChatRelayError = json_error.into();
        assert!(matches!(error, ChatRelayError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: ChatRelayError = yaml_error.into();
        assert!(matches!(error, ChatRelayError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChatRelayError>();
    }
}
