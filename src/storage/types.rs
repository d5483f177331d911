//! Storage record types

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One stored conversation exchange: the user's query and the model's
/// response, with ordering metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    /// Conversation this turn belongs to
    pub conversation_id: String,
    /// RFC 3339 timestamp; history ordering is ascending by this field
    pub timestamp: String,
    /// Identifier of the user who sent the query
    pub user_id: String,
    /// The user's message
    pub query: String,
    /// The model's reply
    pub response: String,
    /// Unique id of this turn
    pub turn_id: String,
}

impl ConversationTurn {
    /// Build a turn stamped with the current time and a fresh turn id.
    pub fn new(
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
        query: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            timestamp: Utc::now().to_rfc3339(),
            user_id: user_id.into(),
            query: query.into(),
            response: response.into(),
            turn_id: Uuid::new_v4().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_turn_generates_unique_ids() {
        let a = ConversationTurn::new("c1", "u1", "q", "r");
        let b = ConversationTurn::new("c1", "u1", "q", "r");
        assert_ne!(a.turn_id, b.turn_id);
    }

    #[test]
    fn test_turn_serializes_all_fields() {
        let turn = ConversationTurn::new("c1", "anonymous", "hello", "hi there");
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(value["conversation_id"], "c1");
        assert_eq!(value["user_id"], "anonymous");
        assert_eq!(value["query"], "hello");
        assert_eq!(value["response"], "hi there");
        assert!(value.get("timestamp").is_some());
        assert!(value.get("turn_id").is_some());
    }
}
