//! Configuration management for ChatRelay
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from a YAML file, environment variables, and CLI overrides.
//! A missing configuration file is not an error: every section has a
//! complete set of defaults so the binary runs out of the box.

use crate::cli::Cli;
use crate::error::{ChatRelayError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for ChatRelay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server identity and bind addresses
    #[serde(default)]
    pub server: ServerConfig,

    /// Model backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Conversation store settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Server identity and transport bind addresses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the persistent WebSocket host
    #[serde(default = "default_ws_bind")]
    pub ws_bind: String,

    /// Bind address for the stateless HTTP gateway
    #[serde(default = "default_http_bind")]
    pub http_bind: String,
}

fn default_ws_bind() -> String {
    "127.0.0.1:8765".to_string()
}

fn default_http_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ws_bind: default_ws_bind(),
            http_bind: default_http_bind(),
        }
    }
}

/// Model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the model runtime endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier; `CHATRELAY_MODEL_ID` overrides it at load time
    #[serde(default = "default_model")]
    pub model: String,

    /// Token budget passed on every invocation
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature passed on every invocation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// HTTP timeout for a single model call (seconds)
    #[serde(default = "default_backend_timeout")]
    pub timeout_seconds: u64,
}

fn default_endpoint() -> String {
    "https://bedrock-runtime.us-east-1.amazonaws.com".to_string()
}

fn default_model() -> String {
    "amazon.nova-lite-v1:0".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

fn default_backend_timeout() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_seconds: default_backend_timeout(),
        }
    }
}

/// Conversation store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file path; when unset the user data directory is used
    #[serde(default)]
    pub db_path: Option<String>,
}

impl Config {
    /// Load configuration from a YAML file, applying CLI overrides.
    ///
    /// A missing file yields the default configuration; an unreadable or
    /// unparsable file is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ChatRelayError::Yaml`] when the file exists but cannot be
    /// parsed, and [`ChatRelayError::Io`] on read failures.
    pub fn load(path: &str, cli: &Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path).map_err(ChatRelayError::Io)?;
            serde_yaml::from_str(&contents).map_err(ChatRelayError::Yaml)?
        } else {
            tracing::debug!("No config file at {path}; using defaults");
            Config::default()
        };

        if let Ok(model_id) = std::env::var("CHATRELAY_MODEL_ID") {
            if !model_id.is_empty() {
                config.backend.model = model_id;
            }
        }

        if let Some(db_path) = &cli.storage_path {
            config.storage.db_path = Some(db_path.clone());
        }

        Ok(config)
    }

    /// Validate the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChatRelayError::Config`] when a bind address is malformed
    /// or a numeric setting is out of range.
    pub fn validate(&self) -> Result<()> {
        for (label, addr) in [
            ("server.ws_bind", &self.server.ws_bind),
            ("server.http_bind", &self.server.http_bind),
        ] {
            if addr.parse::<std::net::SocketAddr>().is_err() {
                return Err(
                    ChatRelayError::Config(format!("{label} is not a valid address: {addr}"))
                        .into(),
                );
            }
        }

        if self.backend.endpoint.is_empty() {
            return Err(ChatRelayError::Config("backend.endpoint is empty".to_string()).into());
        }

        if self.backend.max_tokens == 0 {
            return Err(ChatRelayError::Config("backend.max_tokens must be > 0".to_string()).into());
        }

        if !(0.0..=2.0).contains(&self.backend.temperature) {
            return Err(ChatRelayError::Config(format!(
                "backend.temperature out of range: {}",
                self.backend.temperature
            ))
            .into());
        }

        Ok(())
    }
}
