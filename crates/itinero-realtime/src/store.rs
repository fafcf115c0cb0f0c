//! Message persistence contract used by the dispatcher.

use async_trait::async_trait;

use itinero_core::result::AppResult;
use itinero_database::repositories::chat::{ChatRepository, NewChatMessage};
use itinero_entity::chat::ChatMessage;

/// Durable message log behind the dispatcher.
///
/// The store, never the client, assigns message ids. Edit and delete are
/// conditional on the caller being the message's author and report `false`
/// when no row matched, without distinguishing a missing message from a
/// foreign one.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persists a message and returns it with its assigned id and timestamp.
    async fn append(&self, message: &NewChatMessage) -> AppResult<ChatMessage>;

    /// The most recent `limit` messages of a group, oldest first.
    async fn recent(&self, group_code: &str, limit: i64, offset: i64)
        -> AppResult<Vec<ChatMessage>>;

    /// Replaces a message body when `sender_id` authored it.
    async fn edit_if_sender(
        &self,
        message_id: i64,
        sender_id: i64,
        new_body: &str,
    ) -> AppResult<bool>;

    /// Deletes a message when `sender_id` authored it.
    async fn delete_if_sender(&self, message_id: i64, sender_id: i64) -> AppResult<bool>;

    /// The newest message of a group, if any.
    async fn last_message(&self, group_code: &str) -> AppResult<Option<ChatMessage>>;
}

#[async_trait]
impl MessageStore for ChatRepository {
    async fn append(&self, message: &NewChatMessage) -> AppResult<ChatMessage> {
        ChatRepository::append(self, message).await
    }

    async fn recent(
        &self,
        group_code: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<ChatMessage>> {
        ChatRepository::recent(self, group_code, limit, offset).await
    }

    async fn edit_if_sender(
        &self,
        message_id: i64,
        sender_id: i64,
        new_body: &str,
    ) -> AppResult<bool> {
        Ok(ChatRepository::edit_if_sender(self, message_id, sender_id, new_body)
            .await?
            .is_some())
    }

    async fn delete_if_sender(&self, message_id: i64, sender_id: i64) -> AppResult<bool> {
        ChatRepository::delete_if_sender(self, message_id, sender_id).await
    }

    async fn last_message(&self, group_code: &str) -> AppResult<Option<ChatMessage>> {
        ChatRepository::last_message(self, group_code).await
    }
}
