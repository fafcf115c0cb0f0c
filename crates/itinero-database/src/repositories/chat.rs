//! Chat group and message repository implementation.

use sqlx::PgPool;

use itinero_core::error::{AppError, ErrorKind};
use itinero_core::result::AppResult;
use itinero_entity::chat::{ChatMessage, MessageKind};

/// Fields required to persist a chat message.
#[derive(Debug, Clone)]
pub struct NewChatMessage {
    /// Group the message belongs to.
    pub group_code: String,
    /// Author id.
    pub sender_id: i64,
    /// Author display name, denormalized at write time.
    pub sender_name: String,
    /// Message body.
    pub message: String,
    /// Payload kind.
    pub message_type: MessageKind,
    /// Optional id of the message being replied to.
    pub reply_to_message_id: Option<i64>,
}

/// Repository for chat groups and their message log.
#[derive(Debug, Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    /// Create a new chat repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the chat group row if it does not exist yet. Safe to call on
    /// every connection handshake.
    pub async fn ensure_group(
        &self,
        group_code: &str,
        group_name: &str,
        owner_id: i64,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO chat_groups (group_code, group_name, owner_id) \
             VALUES ($1, $2, $3) ON CONFLICT (group_code) DO NOTHING",
        )
        .bind(group_code)
        .bind(group_name)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to ensure chat group", e))?;
        Ok(())
    }

    /// Look up a single message by id.
    pub async fn find_message(&self, message_id: i64) -> AppResult<Option<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>("SELECT * FROM chat_messages WHERE id = $1")
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find message", e))
    }

    /// Persist a message and return it with its assigned id and timestamp.
    pub async fn append(&self, new_message: &NewChatMessage) -> AppResult<ChatMessage> {
        sqlx::query_as::<_, ChatMessage>(
            "INSERT INTO chat_messages \
             (group_code, sender_id, sender_name, message, message_type, reply_to_message_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&new_message.group_code)
        .bind(new_message.sender_id)
        .bind(&new_message.sender_name)
        .bind(&new_message.message)
        .bind(new_message.message_type)
        .bind(new_message.reply_to_message_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append message", e))
    }

    /// The most recent `limit` messages of a group, oldest first, skipping
    /// `offset` newest messages.
    pub async fn recent(
        &self,
        group_code: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<ChatMessage>> {
        let mut messages = sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM chat_messages WHERE group_code = $1 \
             ORDER BY timestamp DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(group_code)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load history", e))?;
        messages.reverse();
        Ok(messages)
    }

    /// Update a message body only when `sender_id` is its author. Returns the
    /// updated row, or `None` when no matching row exists.
    pub async fn edit_if_sender(
        &self,
        message_id: i64,
        sender_id: i64,
        new_body: &str,
    ) -> AppResult<Option<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(
            "UPDATE chat_messages SET message = $3, is_edited = TRUE \
             WHERE id = $1 AND sender_id = $2 RETURNING *",
        )
        .bind(message_id)
        .bind(sender_id)
        .bind(new_body)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to edit message", e))
    }

    /// Delete a message only when `sender_id` is its author. Returns whether
    /// a row was deleted.
    pub async fn delete_if_sender(&self, message_id: i64, sender_id: i64) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM chat_messages WHERE id = $1 AND sender_id = $2")
                .bind(message_id)
                .bind(sender_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to delete message", e)
                })?;
        Ok(result.rows_affected() > 0)
    }

    /// The newest message of a group, if any.
    pub async fn last_message(&self, group_code: &str) -> AppResult<Option<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM chat_messages WHERE group_code = $1 \
             ORDER BY timestamp DESC, id DESC LIMIT 1",
        )
        .bind(group_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load last message", e))
    }
}
