//! Individual chat connection handle.

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::warn;

/// Unique connection identifier, also embedding the owning user and creation
/// time for log readability.
pub type ConnectionId = String;

/// Outcome of pushing a frame onto a connection's transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Frame accepted by the transport.
    Sent,
    /// Transport buffer full; the receiver has stalled and the connection
    /// must be removed.
    Dropped,
    /// Transport gone; the connection must be removed.
    Closed,
}

/// A handle to a single WebSocket chat connection.
///
/// Immutable once created: a reconnect produces a new handle, the old one is
/// removed. Holds the sender half of the outbound frame channel plus a
/// snapshot of the connected user's identity.
#[derive(Debug)]
pub struct ChatConnection {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// User who owns this connection.
    pub user_id: i64,
    /// Display name at connect time.
    pub user_name: String,
    /// Group this connection is attached to.
    pub group_code: String,
    /// Sender for outbound text frames.
    sender: mpsc::Sender<String>,
}

impl ChatConnection {
    /// Creates a new connection handle. `sequence` comes from the registry's
    /// monotonic counter.
    pub fn new(
        sequence: u64,
        user_id: i64,
        user_name: String,
        group_code: String,
        sender: mpsc::Sender<String>,
    ) -> Self {
        let id = format!(
            "conn_{}_{}_{}",
            sequence,
            user_id,
            Utc::now().timestamp_millis()
        );
        Self {
            id,
            user_id,
            user_name,
            group_code,
            sender,
        }
    }

    /// Pushes an already-encoded frame onto this connection's transport
    /// without blocking.
    pub fn send(&self, frame: String) -> SendOutcome {
        match self.sender.try_send(frame) {
            Ok(()) => SendOutcome::Sent,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Send buffer full, dropping frame");
                SendOutcome::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => SendOutcome::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_connection(buffer: usize) -> (ChatConnection, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(buffer);
        let conn = ChatConnection::new(1, 42, "Alice".into(), "ITN-AAAAA".into(), tx);
        (conn, rx)
    }

    #[test]
    fn connection_id_embeds_user_and_sequence() {
        let (conn, _rx) = make_connection(4);
        assert!(conn.id.starts_with("conn_1_42_"));
    }

    #[tokio::test]
    async fn send_delivers_frames_in_order() {
        let (conn, mut rx) = make_connection(4);
        assert_eq!(conn.send("one".into()), SendOutcome::Sent);
        assert_eq!(conn.send("two".into()), SendOutcome::Sent);
        assert_eq!(rx.recv().await.unwrap(), "one");
        assert_eq!(rx.recv().await.unwrap(), "two");
    }

    #[test]
    fn send_reports_closed_transport() {
        let (conn, rx) = make_connection(4);
        drop(rx);
        assert_eq!(conn.send("lost".into()), SendOutcome::Closed);
    }

    #[test]
    fn send_drops_when_buffer_is_full() {
        let (conn, _rx) = make_connection(1);
        assert_eq!(conn.send("one".into()), SendOutcome::Sent);
        assert_eq!(conn.send("two".into()), SendOutcome::Dropped);
    }
}
