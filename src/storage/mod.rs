//! Conversation store backed by SQLite
//!
//! The store is fully fail-soft at the call sites the protocol engine uses:
//! an append failure is logged and swallowed, and a history query failure
//! yields an empty sequence, indistinguishable from "no prior turns". Only
//! construction (schema initialization) can fail hard.

use crate::config::StorageConfig;
use crate::error::{ChatRelayError, Result};
use anyhow::Context;
use directories::ProjectDirs;
use rusqlite::{params, Connection};
use std::path::PathBuf;

pub mod types;
pub use types::ConversationTurn;

/// SQLite-backed conversation turn store.
pub struct ConversationStore {
    db_path: PathBuf,
}

impl ConversationStore {
    /// Create a store using the configured path, falling back to the user's
    /// data directory.
    ///
    /// The `CHATRELAY_HISTORY_DB` environment variable overrides both, which
    /// makes it easy to point the binary at a test DB or alternate file
    /// without changing the application data dir.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        if let Ok(override_path) = std::env::var("CHATRELAY_HISTORY_DB") {
            return Self::new_with_path(override_path);
        }

        if let Some(path) = &config.db_path {
            return Self::new_with_path(path.clone());
        }

        let proj_dirs = ProjectDirs::from("com", "xbcsmith", "chatrelay")
            .ok_or_else(|| ChatRelayError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| ChatRelayError::Storage(e.to_string()))?;

        Self::new_with_path(data_dir.join("conversations.db"))
    }

    /// Create a store at the specified database path.
    ///
    /// Primarily useful for tests where the default application data
    /// directory is not desirable.
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists so opening the DB file succeeds.
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| ChatRelayError::Storage(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| ChatRelayError::Storage(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS conversation_turns (
                conversation_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                user_id TEXT NOT NULL,
                query TEXT NOT NULL,
                response TEXT NOT NULL,
                turn_id TEXT PRIMARY KEY
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| ChatRelayError::Storage(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_turns_conversation
                ON conversation_turns (conversation_id, timestamp)",
            [],
        )
        .context("Failed to create index")
        .map_err(|e| ChatRelayError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Append one conversation turn. Failures are logged and swallowed; an
    /// append failure never fails the enclosing tool call.
    pub fn append(&self, turn: &ConversationTurn) {
        if let Err(e) = self.try_append(turn) {
            tracing::warn!(
                "Error storing conversation turn for {}: {e}",
                turn.conversation_id
            );
        }
    }

    fn try_append(&self, turn: &ConversationTurn) -> Result<()> {
        let conn = Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| ChatRelayError::Storage(e.to_string()))?;

        conn.execute(
            "INSERT INTO conversation_turns
                (conversation_id, timestamp, user_id, query, response, turn_id)
                VALUES (?, ?, ?, ?, ?, ?)",
            params![
                turn.conversation_id,
                turn.timestamp,
                turn.user_id,
                turn.query,
                turn.response,
                turn.turn_id
            ],
        )
        .context("Failed to insert conversation turn")
        .map_err(|e| ChatRelayError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Fetch a conversation's turns, ascending by timestamp. Failures are
    /// logged and yield an empty history.
    pub fn query_history(&self, conversation_id: &str) -> Vec<ConversationTurn> {
        match self.try_query_history(conversation_id) {
            Ok(turns) => turns,
            Err(e) => {
                tracing::warn!("Error retrieving conversation history for {conversation_id}: {e}");
                Vec::new()
            }
        }
    }

    fn try_query_history(&self, conversation_id: &str) -> Result<Vec<ConversationTurn>> {
        let conn = Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| ChatRelayError::Storage(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT conversation_id, timestamp, user_id, query, response, turn_id
                FROM conversation_turns
                WHERE conversation_id = ?
                ORDER BY timestamp ASC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| ChatRelayError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params![conversation_id], |row| {
                Ok(ConversationTurn {
                    conversation_id: row.get(0)?,
                    timestamp: row.get(1)?,
                    user_id: row.get(2)?,
                    query: row.get(3)?,
                    response: row.get(4)?,
                    turn_id: row.get(5)?,
                })
            })
            .context("Failed to query conversation turns")
            .map_err(|e| ChatRelayError::Storage(e.to_string()))?;

        let mut turns = Vec::new();
        for turn in rows.flatten() {
            turns.push(turn);
        }

        Ok(turns)
    }
}
