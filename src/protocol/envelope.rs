//! Wire envelope codec and message classification
//!
//! One [`Envelope`] is one protocol message: a Request, a Notification, or a
//! Response. Parsing distinguishes malformed JSON (`ParseError`) from a
//! well-formed payload that violates the envelope structure
//! (`InvalidRequest`). Serialization is the exact inverse of parsing: the
//! `id` keeps its original JSON type, so a numeric `2` never round-trips as
//! the string `"2"`.

use serde::{Deserialize, Serialize};

use crate::protocol::errors::{ErrorObject, ProtocolError};

/// The fixed protocol version string carried by every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// A request identifier, opaque to the engine.
///
/// Ids are never interpreted numerically; they are compared and echoed with
/// exact type equality. `Null` exists only for outbound error responses
/// whose originating id could not be determined; it serializes as a literal
/// JSON `null`. An inbound `"id": null` deserializes to an absent id
/// instead, so the message classifies as a Notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// An integer id.
    Number(i64),
    /// A string id.
    String(String),
    /// The explicit null id used when the original id is unknown.
    Null,
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::String(s) => write!(f, "{s}"),
            RequestId::Null => write!(f, "null"),
        }
    }
}

/// The derived kind of an envelope. Never stored; recomputed on every parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Has a method and an id; expects exactly one Response.
    Request,
    /// Has a method and no id; never answered.
    Notification,
    /// Has an id, no method, and exactly one of result/error.
    Response,
}

/// One protocol message unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    /// Protocol version marker; must equal [`JSONRPC_VERSION`].
    pub jsonrpc: String,
    /// Request id; absent on Notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    /// Method name; present on Requests and Notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Method parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    /// Success payload; Responses carry exactly one of result/error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Failure payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl Envelope {
    /// Build a Request envelope.
    pub fn request(id: RequestId, method: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            method: Some(method.into()),
            params: Some(params),
            result: None,
            error: None,
        }
    }

    /// Build a Notification envelope (no id, never answered).
    pub fn notification(method: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: None,
            method: Some(method.into()),
            params: Some(params),
            result: None,
            error: None,
        }
    }

    /// Build a success Response echoing the given id.
    pub fn response(id: RequestId, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            method: None,
            params: None,
            result: Some(result),
            error: None,
        }
    }

    /// Build an error Response.
    ///
    /// Pass [`RequestId::Null`] when the originating id could not be
    /// determined; it serializes as `"id": null` on the wire.
    pub fn error_response(id: RequestId, error: ErrorObject) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            method: None,
            params: None,
            result: None,
            error: Some(error),
        }
    }

    /// Parse a raw payload into an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Parse`] when the payload is not well-formed
    /// JSON, and [`ProtocolError::InvalidRequest`] when it is valid JSON but
    /// not an envelope-shaped object.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| ProtocolError::Parse(e.to_string()))?;

        if !value.is_object() {
            return Err(ProtocolError::InvalidRequest(
                "message is not a JSON object".to_string(),
            ));
        }

        serde_json::from_value(value).map_err(|e| ProtocolError::InvalidRequest(e.to_string()))
    }

    /// Serialize the envelope back to its wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Classify the envelope as Request, Notification, or Response.
    ///
    /// The structural rules are re-validated on every call: a method
    /// combined with a result or error is invalid, as is a Response with
    /// zero or two of result/error.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidRequest`] on any structural
    /// violation, including a wrong `jsonrpc` marker.
    pub fn classify(&self) -> Result<MessageKind, ProtocolError> {
        if self.jsonrpc != JSONRPC_VERSION {
            return Err(ProtocolError::InvalidRequest(format!(
                "unsupported jsonrpc version: {}",
                self.jsonrpc
            )));
        }

        let has_id = self.id.is_some();
        let has_result = self.result.is_some();
        let has_error = self.error.is_some();

        match &self.method {
            Some(_) => {
                if has_result || has_error {
                    return Err(ProtocolError::InvalidRequest(
                        "message carries both a method and a result/error".to_string(),
                    ));
                }
                if has_id {
                    Ok(MessageKind::Request)
                } else {
                    Ok(MessageKind::Notification)
                }
            }
            None => {
                if !has_id {
                    return Err(ProtocolError::InvalidRequest(
                        "message has neither method nor id".to_string(),
                    ));
                }
                if has_result == has_error {
                    return Err(ProtocolError::InvalidRequest(
                        "response must carry exactly one of result or error".to_string(),
                    ));
                }
                Ok(MessageKind::Response)
            }
        }
    }
}

/// Best-effort id extraction from a raw payload, for error responses built
/// before a full parse succeeded. Returns `None` when the payload is not
/// parseable or carries no usable id.
pub fn peek_id(raw: &str) -> Option<RequestId> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    match value.get("id")? {
        serde_json::Value::Number(n) => n.as_i64().map(RequestId::Number),
        serde_json::Value::String(s) => Some(RequestId::String(s.clone())),
        _ => None,
    }
}
