//! Protocol error taxonomy and reserved JSON-RPC codes
//!
//! Every observable protocol failure maps to one of five kinds, each with a
//! fixed reserved negative code. Handlers return [`ProtocolError`] and the
//! router performs the single translation into a wire
//! [`ErrorObject`] at the dispatch boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reserved code for malformed payloads.
pub const CODE_PARSE_ERROR: i64 = -32700;
/// Reserved code for structurally invalid envelopes and unknown catalog names.
pub const CODE_INVALID_REQUEST: i64 = -32600;
/// Reserved code for unknown method names.
pub const CODE_METHOD_NOT_FOUND: i64 = -32601;
/// Reserved code for missing or malformed handler arguments.
pub const CODE_INVALID_PARAMS: i64 = -32602;
/// Reserved code for any otherwise-unclassified handler fault.
pub const CODE_INTERNAL_ERROR: i64 = -32603;

/// A protocol-level failure, classified before or during dispatch.
///
/// The `MethodNotFound` message always carries the offending method name so
/// clients can see what they sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The payload was not well-formed JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The envelope violated the structural rules, or a catalog lookup
    /// (tool/resource/prompt) named an unknown entry.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The method name is not in the fixed catalog.
    #[error("Unknown method: {0}")]
    MethodNotFound(String),

    /// A required argument is missing or has the wrong shape.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Fallback for any handler fault not otherwise classified.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProtocolError {
    /// The reserved numeric code for this error kind.
    pub fn code(&self) -> i64 {
        match self {
            ProtocolError::Parse(_) => CODE_PARSE_ERROR,
            ProtocolError::InvalidRequest(_) => CODE_INVALID_REQUEST,
            ProtocolError::MethodNotFound(_) => CODE_METHOD_NOT_FOUND,
            ProtocolError::InvalidParams(_) => CODE_INVALID_PARAMS,
            ProtocolError::Internal(_) => CODE_INTERNAL_ERROR,
        }
    }

    /// Build the wire error object carried by an error Response.
    pub fn to_error_object(&self) -> ErrorObject {
        ErrorObject {
            code: self.code(),
            message: self.to_string(),
            data: None,
        }
    }
}

/// The `error` member of a Response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorObject {
    /// Reserved negative code identifying the failure kind.
    pub code: i64,
    /// Human-readable description.
    pub message: String,
    /// Optional structured detail; omitted from the wire when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_codes() {
        assert_eq!(ProtocolError::Parse("x".into()).code(), -32700);
        assert_eq!(ProtocolError::InvalidRequest("x".into()).code(), -32600);
        assert_eq!(ProtocolError::MethodNotFound("x".into()).code(), -32601);
        assert_eq!(ProtocolError::InvalidParams("x".into()).code(), -32602);
        assert_eq!(ProtocolError::Internal("x".into()).code(), -32603);
    }

    #[test]
    fn test_method_not_found_message_contains_method_name() {
        let err = ProtocolError::MethodNotFound("foo/bar".into());
        assert!(err.to_string().contains("foo/bar"));
        assert!(err.to_error_object().message.contains("foo/bar"));
    }

    #[test]
    fn test_error_object_omits_null_data() {
        let obj = ProtocolError::InvalidParams("conversation_id is required".into())
            .to_error_object();
        let json = serde_json::to_value(&obj).unwrap();
        assert_eq!(json["code"], -32602);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_error_object_roundtrip() {
        let obj = ErrorObject {
            code: -32601,
            message: "Unknown method: foo".into(),
            data: Some(serde_json::json!({"hint": "check the catalog"})),
        };
        let json = serde_json::to_string(&obj).unwrap();
        let back: ErrorObject = serde_json::from_str(&json).unwrap();
        assert_eq!(back, obj);
    }
}
