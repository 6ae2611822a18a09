//! Persisted chat message operations
//!
//! The pipeline stores the user's message and the rendered assistant payload
//! for every successful turn; failed turns persist nothing.

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{ChatRole, StoredChatMessage};

impl Database {
    /// Append a chat message for a user
    ///
    /// `response_type` is the payload tag (TEXT/TABLE/CHART) for assistant
    /// messages and `None` for user messages. `content` is plain text for
    /// user messages and the serialized payload for assistant messages.
    pub fn insert_chat_message(
        &self,
        user_id: &str,
        role: ChatRole,
        response_type: Option<&str>,
        content: &str,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO chat_messages (user_id, role, response_type, content) VALUES (?, ?, ?, ?)",
            params![user_id, role.as_str(), response_type, content],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List a user's chat messages, oldest first
    pub fn list_chat_messages(&self, user_id: &str, limit: i64) -> Result<Vec<StoredChatMessage>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, role, response_type, content, created_at
            FROM (
                SELECT id, role, response_type, content, created_at
                FROM chat_messages
                WHERE user_id = ?
                ORDER BY id DESC
                LIMIT ?
            )
            ORDER BY id ASC
            "#,
        )?;

        let rows = stmt.query_map(params![user_id, limit], |row| {
            let role: String = row.get(1)?;
            Ok(StoredChatMessage {
                id: row.get(0)?,
                role: role.parse().map_err(|e: String| {
                    rusqlite::Error::FromSqlConversionFailure(
                        1,
                        rusqlite::types::Type::Text,
                        e.into(),
                    )
                })?,
                response_type: row.get(2)?,
                content: row.get(3)?,
                created_at: parse_datetime(&row.get::<_, String>(4)?),
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Delete a user's chat history, returning the number of removed messages
    pub fn clear_chat_messages(&self, user_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM chat_messages WHERE user_id = ?",
            params![user_id],
        )?;
        Ok(deleted)
    }
}
