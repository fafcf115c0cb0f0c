//! Group chat wire protocol.
//!
//! Clients send an [`Envelope`] whose `data` field carries a JSON-encoded
//! per-action payload, decoded lazily once the action tag is known. The
//! server sends flat [`ChatNotification`] frames whose optional fields are
//! populated per tag and omitted otherwise.

use serde::{Deserialize, Serialize};

use itinero_entity::chat::{ChatMessage, MessageKind};

/// Action tag shared by inbound envelopes and outbound notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatAction {
    /// Client intent to join a group (handled by the connection handshake).
    JoinGroup,
    /// Client intent to leave a group (handled by connection close).
    LeaveGroup,
    /// Client publishes a new message.
    SendMessage,
    /// Client edits one of its messages.
    EditMessage,
    /// Client deletes one of its messages.
    DeleteMessage,
    /// Client started typing.
    TypingStart,
    /// Client stopped typing.
    TypingStop,
    /// Server: a user came online in the group.
    UserJoined,
    /// Server: a user left the group.
    UserLeft,
    /// Server: a persisted message is being delivered.
    MessageReceived,
    /// Server: an action failed.
    Error,
}

/// Inbound client frame. The `data` payload stays an opaque string until the
/// action tag selects its concrete type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Action tag.
    #[serde(rename = "type")]
    pub action: ChatAction,
    /// Group the client believes it is talking to.
    pub group_code: String,
    /// JSON-encoded per-action payload.
    #[serde(default)]
    pub data: String,
}

/// Payload of a `SEND_MESSAGE` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Message body.
    pub message: String,
    /// Payload kind, defaulting to text.
    #[serde(default)]
    pub message_type: MessageKind,
    /// Optional id of the message being replied to.
    #[serde(default)]
    pub reply_to_message_id: Option<i64>,
}

/// Payload of an `EDIT_MESSAGE` envelope. The message id is optional on the
/// wire; a missing id is reported back to the sender as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMessageRequest {
    /// Replacement body.
    pub new_message: String,
    /// Message to edit.
    #[serde(default)]
    pub message_id: Option<i64>,
}

/// Payload of a `DELETE_MESSAGE` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessageRequest {
    /// Message to delete.
    pub message_id: i64,
}

/// Typing state relayed to the rest of the group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingIndicator {
    /// Who is typing.
    pub user_id: i64,
    /// Their display name.
    pub user_name: String,
    /// Whether typing started or stopped.
    pub is_typing: bool,
}

/// Flat outbound server frame. Exactly the fields relevant to `type` are
/// populated; the rest are omitted from the JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatNotification {
    /// Notification tag.
    #[serde(rename = "type")]
    pub action: ChatAction,
    /// Group the notification concerns.
    pub group_code: String,
    /// Subject user, for presence and edit/delete tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Subject user's display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Delivered message, for `MESSAGE_RECEIVED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ChatMessage>,
    /// Typing state, for `TYPING_START` / `TYPING_STOP`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typing_indicator: Option<TypingIndicator>,
    /// Error description, for `ERROR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Edited message id, for `EDIT_MESSAGE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_message_id: Option<i64>,
    /// New body of the edited message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_message: Option<String>,
    /// Deleted message id, for `DELETE_MESSAGE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_message_id: Option<i64>,
}

impl ChatNotification {
    fn bare(action: ChatAction, group_code: &str) -> Self {
        Self {
            action,
            group_code: group_code.to_string(),
            user_id: None,
            user_name: None,
            message: None,
            typing_indicator: None,
            error: None,
            edited_message_id: None,
            edited_message: None,
            deleted_message_id: None,
        }
    }

    /// A user came online in the group.
    pub fn user_joined(group_code: &str, user_id: i64, user_name: &str) -> Self {
        Self {
            user_id: Some(user_id),
            user_name: Some(user_name.to_string()),
            ..Self::bare(ChatAction::UserJoined, group_code)
        }
    }

    /// A user's last connection in the group went away.
    pub fn user_left(group_code: &str, user_id: i64, user_name: &str) -> Self {
        Self {
            user_id: Some(user_id),
            user_name: Some(user_name.to_string()),
            ..Self::bare(ChatAction::UserLeft, group_code)
        }
    }

    /// Delivery of a persisted message.
    pub fn message_received(group_code: &str, message: ChatMessage) -> Self {
        Self {
            message: Some(message),
            ..Self::bare(ChatAction::MessageReceived, group_code)
        }
    }

    /// A message was edited.
    pub fn message_edited(
        group_code: &str,
        user_id: i64,
        user_name: &str,
        message_id: i64,
        new_body: &str,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            user_name: Some(user_name.to_string()),
            edited_message_id: Some(message_id),
            edited_message: Some(new_body.to_string()),
            ..Self::bare(ChatAction::EditMessage, group_code)
        }
    }

    /// A message was deleted.
    pub fn message_deleted(
        group_code: &str,
        user_id: i64,
        user_name: &str,
        message_id: i64,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            user_name: Some(user_name.to_string()),
            deleted_message_id: Some(message_id),
            ..Self::bare(ChatAction::DeleteMessage, group_code)
        }
    }

    /// Typing state relay; the tag mirrors `is_typing`.
    pub fn typing(group_code: &str, indicator: TypingIndicator) -> Self {
        let action = if indicator.is_typing {
            ChatAction::TypingStart
        } else {
            ChatAction::TypingStop
        };
        Self {
            typing_indicator: Some(indicator),
            ..Self::bare(action, group_code)
        }
    }

    /// An action failed.
    pub fn error(group_code: &str, description: impl Into<String>) -> Self {
        Self {
            error: Some(description.into()),
            ..Self::bare(ChatAction::Error, group_code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn action_tags_use_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&ChatAction::MessageReceived).unwrap(),
            "\"MESSAGE_RECEIVED\""
        );
        assert_eq!(
            serde_json::from_str::<ChatAction>("\"TYPING_START\"").unwrap(),
            ChatAction::TypingStart
        );
    }

    #[test]
    fn envelope_decodes_with_opaque_data() {
        let raw = r#"{"type":"SEND_MESSAGE","groupCode":"ITN-AAAAA","data":"{\"message\":\"hi\"}"}"#;
        let envelope: Envelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.action, ChatAction::SendMessage);
        assert_eq!(envelope.group_code, "ITN-AAAAA");

        let payload: SendMessageRequest = serde_json::from_str(&envelope.data).unwrap();
        assert_eq!(payload.message, "hi");
        assert_eq!(payload.message_type, MessageKind::Text);
        assert_eq!(payload.reply_to_message_id, None);
    }

    #[test]
    fn send_request_accepts_reply_and_kind() {
        let payload: SendMessageRequest = serde_json::from_str(
            r#"{"message":"look","messageType":"IMAGE","replyToMessageId":12}"#,
        )
        .unwrap();
        assert_eq!(payload.message_type, MessageKind::Image);
        assert_eq!(payload.reply_to_message_id, Some(12));
    }

    #[test]
    fn edit_request_tolerates_missing_message_id() {
        let payload: EditMessageRequest =
            serde_json::from_str(r#"{"newMessage":"fixed"}"#).unwrap();
        assert_eq!(payload.message_id, None);
    }

    #[test]
    fn notification_omits_unused_fields() {
        let frame = serde_json::to_string(&ChatNotification::user_joined("ITN-AAAAA", 3, "Cleo"))
            .unwrap();
        assert!(frame.contains("\"type\":\"USER_JOINED\""));
        assert!(frame.contains("\"userId\":3"));
        assert!(!frame.contains("error"));
        assert!(!frame.contains("message\""));
    }

    #[test]
    fn message_notification_uses_reply_alias() {
        let message = ChatMessage {
            id: 9,
            group_code: "ITN-AAAAA".into(),
            sender_id: 3,
            sender_name: "Cleo".into(),
            message: "pong".into(),
            message_type: MessageKind::Text,
            timestamp: Utc::now(),
            is_edited: false,
            reply_to_message_id: Some(4),
        };
        let frame =
            serde_json::to_string(&ChatNotification::message_received("ITN-AAAAA", message))
                .unwrap();
        assert!(frame.contains("\"type\":\"MESSAGE_RECEIVED\""));
        assert!(frame.contains("\"replyToId\":4"));
        assert!(frame.contains("\"messageType\":\"TEXT\""));
    }

    #[test]
    fn typing_tag_follows_the_flag() {
        let start = ChatNotification::typing(
            "ITN-AAAAA",
            TypingIndicator {
                user_id: 1,
                user_name: "Ann".into(),
                is_typing: true,
            },
        );
        let stop = ChatNotification::typing(
            "ITN-AAAAA",
            TypingIndicator {
                user_id: 1,
                user_name: "Ann".into(),
                is_typing: false,
            },
        );
        assert_eq!(start.action, ChatAction::TypingStart);
        assert_eq!(stop.action, ChatAction::TypingStop);
    }
}
