//! Chat registry — connection lifecycle and group fan-out with pruning.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use itinero_core::config::ChatConfig;
use itinero_entity::chat::ChatMessage;

use crate::broadcast;
use crate::connection::ChatConnection;
use crate::protocol::{ChatNotification, TypingIndicator};
use crate::roster::ChatRoster;

/// Owns the roster and implements the group chat delivery semantics:
/// presence notifications on register/deregister and best-effort fan-out
/// that removes connections whose transport has closed.
#[derive(Debug)]
pub struct ChatRegistry {
    roster: ChatRoster,
    sequence: AtomicU64,
    send_buffer_size: usize,
}

impl ChatRegistry {
    /// Creates a registry with transport buffers sized from chat config.
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            roster: ChatRoster::new(),
            sequence: AtomicU64::new(0),
            send_buffer_size: config.send_buffer_size,
        }
    }

    /// Registers a new connection for `user_id` in `group_code`.
    ///
    /// Returns the connection handle and the receiver half of its outbound
    /// frame channel. Everyone in the group, the new connection included, is
    /// told the user joined.
    pub fn register(
        &self,
        user_id: i64,
        user_name: &str,
        group_code: &str,
    ) -> (Arc<ChatConnection>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.send_buffer_size);
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let conn = Arc::new(ChatConnection::new(
            sequence,
            user_id,
            user_name.to_string(),
            group_code.to_string(),
            tx,
        ));

        self.roster.insert(conn.clone());
        self.broadcast_to_group(
            group_code,
            &ChatNotification::user_joined(group_code, user_id, user_name),
            None,
        );

        info!(
            conn_id = %conn.id,
            user_id,
            group_code,
            total = self.roster.total_connections(),
            "Chat connection registered"
        );

        (conn, rx)
    }

    /// Deregisters a connection. Idempotent; when the user's last connection
    /// in the group goes away, the rest of the group is told they left.
    pub fn deregister(&self, conn: &Arc<ChatConnection>) {
        if !self.roster.remove(conn) {
            return;
        }

        if !self.roster.user_in_group(conn.user_id, &conn.group_code) {
            self.broadcast_to_group(
                &conn.group_code,
                &ChatNotification::user_left(&conn.group_code, conn.user_id, &conn.user_name),
                Some(conn.user_id),
            );
        }

        info!(
            conn_id = %conn.id,
            user_id = conn.user_id,
            group_code = %conn.group_code,
            total = self.roster.total_connections(),
            "Chat connection deregistered"
        );
    }

    /// Fans a notification out to a group, optionally excluding one user's
    /// connections.
    ///
    /// Connections whose transport has closed are removed as they are found.
    /// Each removal that empties a user's presence in a group queues a
    /// USER_LEFT of its own, so the fan-out runs as a worklist until no
    /// deliveries remain.
    pub fn broadcast_to_group(
        &self,
        group_code: &str,
        notification: &ChatNotification,
        exclude_user: Option<i64>,
    ) {
        let frame = broadcast::encode(notification);
        let mut worklist = vec![(group_code.to_string(), frame, exclude_user)];

        while let Some((group, frame, exclude)) = worklist.pop() {
            let snapshot = self.roster.group_snapshot(&group);
            if snapshot.is_empty() {
                continue;
            }

            for dead in broadcast::deliver(&snapshot, &frame, exclude) {
                if !self.roster.remove(&dead) {
                    continue;
                }
                debug!(
                    conn_id = %dead.id,
                    user_id = dead.user_id,
                    group_code = %dead.group_code,
                    "Pruned dead connection during fan-out"
                );
                if !self.roster.user_in_group(dead.user_id, &dead.group_code) {
                    let left = ChatNotification::user_left(
                        &dead.group_code,
                        dead.user_id,
                        &dead.user_name,
                    );
                    worklist.push((
                        dead.group_code.clone(),
                        broadcast::encode(&left),
                        Some(dead.user_id),
                    ));
                }
            }
        }
    }

    /// Sends a notification to every connection of one user, pruning dead
    /// ones the same way as a group fan-out.
    pub fn send_to_user(&self, user_id: i64, notification: &ChatNotification) {
        let frame = broadcast::encode(notification);
        let snapshot = self.roster.user_snapshot(user_id);

        for dead in broadcast::deliver(&snapshot, &frame, None) {
            if !self.roster.remove(&dead) {
                continue;
            }
            if !self.roster.user_in_group(dead.user_id, &dead.group_code) {
                self.broadcast_to_group(
                    &dead.group_code,
                    &ChatNotification::user_left(&dead.group_code, dead.user_id, &dead.user_name),
                    Some(dead.user_id),
                );
            }
        }
    }

    /// Delivers a persisted message to the whole group, sender included.
    pub fn broadcast_message(&self, group_code: &str, message: ChatMessage) {
        self.broadcast_to_group(
            group_code,
            &ChatNotification::message_received(group_code, message),
            None,
        );
    }

    /// Relays a typing indicator to everyone but the typist.
    pub fn broadcast_typing(&self, group_code: &str, indicator: TypingIndicator) {
        let typist = indicator.user_id;
        self.broadcast_to_group(
            group_code,
            &ChatNotification::typing(group_code, indicator),
            Some(typist),
        );
    }

    /// Whether the user has any open connection.
    pub fn is_user_online(&self, user_id: i64) -> bool {
        self.roster.is_online(user_id)
    }

    /// Distinct users currently connected to a group.
    pub fn online_users_in_group(&self, group_code: &str) -> Vec<i64> {
        self.roster.online_users(group_code)
    }

    /// Number of connections in one group.
    pub fn group_connection_count(&self, group_code: &str) -> usize {
        self.roster.connection_count(group_code)
    }

    /// Total connections across all groups.
    pub fn total_connections(&self) -> usize {
        self.roster.total_connections()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tokio::sync::mpsc::Receiver;

    const GROUP: &str = "ITN-TESTS";

    fn registry() -> ChatRegistry {
        ChatRegistry::new(&ChatConfig::default())
    }

    fn drain(rx: &mut Receiver<String>) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    fn tags(frames: &[Value]) -> Vec<String> {
        frames
            .iter()
            .map(|f| f["type"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn register_notifies_the_whole_group_including_the_joiner() {
        let registry = registry();
        let (_a, mut rx_a) = registry.register(1, "Ann", GROUP);
        let (_b, mut rx_b) = registry.register(2, "Ben", GROUP);

        let a_frames = drain(&mut rx_a);
        assert_eq!(tags(&a_frames), vec!["USER_JOINED", "USER_JOINED"]);

        let b_frames = drain(&mut rx_b);
        assert_eq!(tags(&b_frames), vec!["USER_JOINED"]);
        assert_eq!(b_frames[0]["userId"], 2);
    }

    #[tokio::test]
    async fn deregister_notifies_others_but_not_the_departing_user() {
        let registry = registry();
        let (a, mut rx_a) = registry.register(1, "Ann", GROUP);
        let (_b, mut rx_b) = registry.register(2, "Ben", GROUP);
        drain(&mut rx_a);
        drain(&mut rx_b);

        registry.deregister(&a);

        assert!(drain(&mut rx_a).is_empty());
        let frames = drain(&mut rx_b);
        assert_eq!(tags(&frames), vec!["USER_LEFT"]);
        assert_eq!(frames[0]["userId"], 1);
        assert_eq!(frames[0]["userName"], "Ann");
    }

    #[tokio::test]
    async fn deregister_is_idempotent() {
        let registry = registry();
        let (a, _rx_a) = registry.register(1, "Ann", GROUP);
        let (_b, mut rx_b) = registry.register(2, "Ben", GROUP);
        drain(&mut rx_b);

        registry.deregister(&a);
        registry.deregister(&a);

        assert_eq!(tags(&drain(&mut rx_b)), vec!["USER_LEFT"]);
    }

    #[tokio::test]
    async fn no_user_left_while_another_device_remains() {
        let registry = registry();
        let (phone, _rx_phone) = registry.register(1, "Ann", GROUP);
        let (_laptop, _rx_laptop) = registry.register(1, "Ann", GROUP);
        let (_b, mut rx_b) = registry.register(2, "Ben", GROUP);
        drain(&mut rx_b);

        registry.deregister(&phone);
        assert!(drain(&mut rx_b).is_empty());
        assert!(registry.is_user_online(1));
    }

    #[tokio::test]
    async fn broadcast_excludes_every_connection_of_the_excluded_user() {
        let registry = registry();
        let (_p, mut rx_phone) = registry.register(1, "Ann", GROUP);
        let (_l, mut rx_laptop) = registry.register(1, "Ann", GROUP);
        let (_b, mut rx_b) = registry.register(2, "Ben", GROUP);
        drain(&mut rx_phone);
        drain(&mut rx_laptop);
        drain(&mut rx_b);

        registry.broadcast_to_group(GROUP, &ChatNotification::error(GROUP, "x"), Some(1));

        assert!(drain(&mut rx_phone).is_empty());
        assert!(drain(&mut rx_laptop).is_empty());
        assert_eq!(tags(&drain(&mut rx_b)), vec!["ERROR"]);
    }

    #[tokio::test]
    async fn dead_connection_is_pruned_and_its_departure_announced() {
        let registry = registry();
        let (_a, rx_a) = registry.register(1, "Ann", GROUP);
        let (_b, mut rx_b) = registry.register(2, "Ben", GROUP);
        drain(&mut rx_b);

        // Ann's transport dies without a clean close.
        drop(rx_a);

        registry.broadcast_to_group(GROUP, &ChatNotification::error(GROUP, "ping"), None);

        let frames = drain(&mut rx_b);
        assert_eq!(tags(&frames), vec!["ERROR", "USER_LEFT"]);
        assert_eq!(frames[1]["userId"], 1);
        assert!(!registry.is_user_online(1));
        assert_eq!(registry.group_connection_count(GROUP), 1);
    }

    #[tokio::test]
    async fn stalled_connection_is_pruned_and_its_departure_announced() {
        let config = ChatConfig {
            send_buffer_size: 1,
            ..ChatConfig::default()
        };
        let registry = ChatRegistry::new(&config);
        let (_a, mut rx_a) = registry.register(1, "Ann", GROUP);
        drain(&mut rx_a);
        let (_b, mut rx_b) = registry.register(2, "Ben", GROUP);
        drain(&mut rx_a);
        drain(&mut rx_b);

        // Ann stops reading; the first frame fills her one-slot buffer and
        // the second cannot be queued.
        registry.broadcast_to_group(GROUP, &ChatNotification::error(GROUP, "one"), None);
        registry.broadcast_to_group(GROUP, &ChatNotification::error(GROUP, "two"), None);

        assert!(!registry.is_user_online(1));
        assert_eq!(registry.group_connection_count(GROUP), 1);
        let frames = drain(&mut rx_b);
        assert_eq!(tags(&frames), vec!["ERROR", "ERROR", "USER_LEFT"]);
        assert_eq!(frames[2]["userId"], 1);
        assert_eq!(tags(&drain(&mut rx_a)), vec!["ERROR"]);
    }

    #[tokio::test]
    async fn transitive_dead_connections_are_all_pruned() {
        let registry = registry();
        let (_a, rx_a) = registry.register(1, "Ann", GROUP);
        let (_b, rx_b) = registry.register(2, "Ben", GROUP);
        let (_c, mut rx_c) = registry.register(3, "Cleo", GROUP);
        drain(&mut rx_c);

        drop(rx_a);
        drop(rx_b);

        registry.broadcast_to_group(GROUP, &ChatNotification::error(GROUP, "ping"), None);

        let frames = drain(&mut rx_c);
        let tags = tags(&frames);
        assert_eq!(tags.iter().filter(|t| *t == "USER_LEFT").count(), 2);
        assert_eq!(registry.group_connection_count(GROUP), 1);
        assert_eq!(registry.online_users_in_group(GROUP), vec![3]);
    }

    #[tokio::test]
    async fn message_broadcast_reaches_the_sender_too() {
        let registry = registry();
        let (_a, mut rx_a) = registry.register(1, "Ann", GROUP);
        drain(&mut rx_a);

        let message = itinero_entity::chat::ChatMessage {
            id: 5,
            group_code: GROUP.into(),
            sender_id: 1,
            sender_name: "Ann".into(),
            message: "hello".into(),
            message_type: itinero_entity::chat::MessageKind::Text,
            timestamp: chrono::Utc::now(),
            is_edited: false,
            reply_to_message_id: None,
        };
        registry.broadcast_message(GROUP, message);

        let frames = drain(&mut rx_a);
        assert_eq!(tags(&frames), vec!["MESSAGE_RECEIVED"]);
        assert_eq!(frames[0]["message"]["id"], 5);
    }

    #[tokio::test]
    async fn typing_is_not_echoed_to_the_typist() {
        let registry = registry();
        let (_a, mut rx_a) = registry.register(1, "Ann", GROUP);
        let (_b, mut rx_b) = registry.register(2, "Ben", GROUP);
        drain(&mut rx_a);
        drain(&mut rx_b);

        registry.broadcast_typing(
            GROUP,
            TypingIndicator {
                user_id: 1,
                user_name: "Ann".into(),
                is_typing: true,
            },
        );

        assert!(drain(&mut rx_a).is_empty());
        let frames = drain(&mut rx_b);
        assert_eq!(tags(&frames), vec!["TYPING_START"]);
        assert_eq!(frames[0]["typingIndicator"]["isTyping"], true);
    }

    #[tokio::test]
    async fn groups_are_isolated() {
        let registry = registry();
        let (_a, mut rx_a) = registry.register(1, "Ann", "ITN-ONE01");
        let (_b, mut rx_b) = registry.register(2, "Ben", "ITN-TWO02");
        drain(&mut rx_a);
        drain(&mut rx_b);

        registry.broadcast_to_group("ITN-ONE01", &ChatNotification::error("ITN-ONE01", "x"), None);

        assert_eq!(tags(&drain(&mut rx_a)), vec!["ERROR"]);
        assert!(drain(&mut rx_b).is_empty());
    }
}
