//! Per-connection protocol dispatcher.
//!
//! One dispatcher exists per connection and handles its inbound frames
//! strictly in order. A malformed or failed frame never tears down the
//! receive loop: the actor gets an ERROR notification and the loop moves on.

use std::sync::Arc;

use tracing::{debug, warn};

use itinero_database::repositories::chat::NewChatMessage;

use crate::connection::ChatConnection;
use crate::protocol::{
    ChatAction, ChatNotification, DeleteMessageRequest, EditMessageRequest, Envelope,
    SendMessageRequest, TypingIndicator,
};
use crate::registry::ChatRegistry;
use crate::store::MessageStore;

/// Handles the frames of a single registered connection.
pub struct ChatDispatcher {
    registry: Arc<ChatRegistry>,
    store: Arc<dyn MessageStore>,
    conn: Arc<ChatConnection>,
}

impl ChatDispatcher {
    /// Creates a dispatcher bound to one connection.
    pub fn new(
        registry: Arc<ChatRegistry>,
        store: Arc<dyn MessageStore>,
        conn: Arc<ChatConnection>,
    ) -> Self {
        Self {
            registry,
            store,
            conn,
        }
    }

    /// Handles one raw text frame from the client.
    pub async fn handle_frame(&self, raw: &str) {
        let envelope: Envelope = match serde_json::from_str(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                debug!(
                    conn_id = %self.conn.id,
                    error = %e,
                    "Undecodable frame"
                );
                self.error_to_origin(format!("Failed to process message: {e}"));
                return;
            }
        };

        // The group a connection may act on was fixed at handshake time; an
        // envelope naming another group is not trusted.
        match envelope.action {
            ChatAction::SendMessage => self.handle_send(&envelope.data).await,
            ChatAction::EditMessage => self.handle_edit(&envelope.data).await,
            ChatAction::DeleteMessage => self.handle_delete(&envelope.data).await,
            ChatAction::TypingStart => self.handle_typing(true),
            ChatAction::TypingStop => self.handle_typing(false),
            other => {
                debug!(
                    conn_id = %self.conn.id,
                    action = ?other,
                    "Ignoring unhandled client action"
                );
            }
        }
    }

    async fn handle_send(&self, data: &str) {
        let request: SendMessageRequest = match serde_json::from_str(data) {
            Ok(request) => request,
            Err(e) => {
                self.error_to_origin(format!("Failed to process message: {e}"));
                return;
            }
        };

        if request.reply_to_message_id.is_some() {
            debug!(
                conn_id = %self.conn.id,
                reply_to = ?request.reply_to_message_id,
                "Reply message received"
            );
        }

        let draft = NewChatMessage {
            group_code: self.conn.group_code.clone(),
            sender_id: self.conn.user_id,
            sender_name: self.conn.user_name.clone(),
            message: request.message,
            message_type: request.message_type,
            reply_to_message_id: request.reply_to_message_id,
        };

        match self.store.append(&draft).await {
            Ok(saved) => {
                self.registry
                    .broadcast_message(&self.conn.group_code, saved);
            }
            Err(e) => {
                warn!(
                    conn_id = %self.conn.id,
                    error = %e,
                    "Failed to persist message"
                );
                self.error_to_origin("Failed to send message");
            }
        }
    }

    async fn handle_edit(&self, data: &str) {
        let request: EditMessageRequest = match serde_json::from_str(data) {
            Ok(request) => request,
            Err(e) => {
                self.error_to_origin(format!("Failed to process message: {e}"));
                return;
            }
        };

        let Some(message_id) = request.message_id else {
            self.error_to_origin("Missing messageId for edit");
            return;
        };

        match self
            .store
            .edit_if_sender(message_id, self.conn.user_id, &request.new_message)
            .await
        {
            Ok(true) => {
                self.registry.broadcast_to_group(
                    &self.conn.group_code,
                    &ChatNotification::message_edited(
                        &self.conn.group_code,
                        self.conn.user_id,
                        &self.conn.user_name,
                        message_id,
                        &request.new_message,
                    ),
                    Some(self.conn.user_id),
                );
            }
            Ok(false) => self.error_to_origin("Edit failed or not authorized"),
            Err(e) => {
                warn!(conn_id = %self.conn.id, error = %e, "Edit failed");
                self.error_to_origin("Edit failed or not authorized");
            }
        }
    }

    async fn handle_delete(&self, data: &str) {
        let request: DeleteMessageRequest = match serde_json::from_str(data) {
            Ok(request) => request,
            Err(e) => {
                self.error_to_origin(format!("Failed to process message: {e}"));
                return;
            }
        };

        match self
            .store
            .delete_if_sender(request.message_id, self.conn.user_id)
            .await
        {
            Ok(true) => {
                self.registry.broadcast_to_group(
                    &self.conn.group_code,
                    &ChatNotification::message_deleted(
                        &self.conn.group_code,
                        self.conn.user_id,
                        &self.conn.user_name,
                        request.message_id,
                    ),
                    Some(self.conn.user_id),
                );
            }
            Ok(false) => self.error_to_origin("Delete failed or not authorized"),
            Err(e) => {
                warn!(conn_id = %self.conn.id, error = %e, "Delete failed");
                self.error_to_origin("Delete failed or not authorized");
            }
        }
    }

    fn handle_typing(&self, is_typing: bool) {
        self.registry.broadcast_typing(
            &self.conn.group_code,
            TypingIndicator {
                user_id: self.conn.user_id,
                user_name: self.conn.user_name.clone(),
                is_typing,
            },
        );
    }

    /// Sends an ERROR notification to this connection only.
    fn error_to_origin(&self, description: impl Into<String>) {
        let frame = crate::broadcast::encode(&ChatNotification::error(
            &self.conn.group_code,
            description,
        ));
        self.conn.send(frame);
    }
}
