//! Chat entity models: persisted messages and member projections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Kind of a chat message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_kind", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    /// Plain text message.
    Text,
    /// Image attachment reference.
    Image,
    /// File attachment reference.
    File,
    /// Server-generated system message.
    System,
}

impl Default for MessageKind {
    fn default() -> Self {
        Self::Text
    }
}

/// A persisted chat message.
///
/// The id is assigned by the message store on insert, never by the client.
/// The sender name is denormalized at send time and not re-resolved later.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Store-assigned message id (0 until persisted).
    pub id: i64,
    /// Group the message belongs to.
    pub group_code: String,
    /// Author's user id.
    pub sender_id: i64,
    /// Author's display name, snapshotted at send time.
    pub sender_name: String,
    /// Message body.
    pub message: String,
    /// Payload kind.
    pub message_type: MessageKind,
    /// Creation time (ISO-8601 on the wire).
    pub timestamp: DateTime<Utc>,
    /// Whether the body has been edited since creation.
    pub is_edited: bool,
    /// Message this one replies to, if any.
    #[serde(rename = "replyToId")]
    pub reply_to_message_id: Option<i64>,
}

/// Member projection for the chat member listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMember {
    /// Member's user id.
    pub user_id: i64,
    /// Member's display name.
    pub user_name: String,
    /// Whether the member currently holds a live connection.
    pub is_online: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_with_original_wire_names() {
        let msg = ChatMessage {
            id: 7,
            group_code: "ITN-00042".to_string(),
            sender_id: 3,
            sender_name: "Ada Lovelace".to_string(),
            message: "hi".to_string(),
            message_type: MessageKind::Text,
            timestamp: Utc::now(),
            is_edited: false,
            reply_to_message_id: Some(5),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["groupCode"], "ITN-00042");
        assert_eq!(json["messageType"], "TEXT");
        assert_eq!(json["isEdited"], false);
        assert_eq!(json["replyToId"], 5);
    }
}
