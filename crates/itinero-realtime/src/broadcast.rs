//! Single-pass fan-out of an encoded frame to a connection snapshot.

use std::sync::Arc;

use tracing::debug;

use crate::connection::{ChatConnection, SendOutcome};
use crate::protocol::ChatNotification;

/// Encodes a notification once for delivery to many connections.
pub fn encode(notification: &ChatNotification) -> String {
    // The notification type holds only serializable fields, so encoding
    // cannot fail.
    serde_json::to_string(notification).unwrap_or_else(|e| {
        debug!(error = %e, "Notification encoding failed, sending error frame");
        format!(
            r#"{{"type":"ERROR","groupCode":{},"error":"encoding failure"}}"#,
            serde_json::to_string(&notification.group_code).unwrap_or_else(|_| "\"\"".into())
        )
    })
}

/// Delivers `frame` to every connection in `targets` except those owned by
/// `exclude_user`. Returns the connections that failed to take the frame,
/// whether the transport closed or its buffer is full; the caller is
/// responsible for removing them.
pub fn deliver(
    targets: &[Arc<ChatConnection>],
    frame: &str,
    exclude_user: Option<i64>,
) -> Vec<Arc<ChatConnection>> {
    let mut failed = Vec::new();
    for conn in targets {
        if exclude_user.is_some_and(|excluded| conn.user_id == excluded) {
            continue;
        }
        let outcome = conn.send(frame.to_string());
        if outcome != SendOutcome::Sent {
            debug!(
                conn_id = %conn.id,
                user_id = conn.user_id,
                ?outcome,
                "Delivery failed during fan-out"
            );
            failed.push(conn.clone());
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn conn(seq: u64, user_id: i64) -> (Arc<ChatConnection>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        let conn = Arc::new(ChatConnection::new(
            seq,
            user_id,
            format!("user-{user_id}"),
            "ITN-AAAAA".into(),
            tx,
        ));
        (conn, rx)
    }

    #[tokio::test]
    async fn delivers_to_everyone_but_the_excluded_user() {
        let (a, mut rx_a) = conn(1, 1);
        let (b, mut rx_b) = conn(2, 2);
        let targets = vec![a, b];

        let failed = deliver(&targets, "frame", Some(1));
        assert!(failed.is_empty());
        assert_eq!(rx_b.recv().await.unwrap(), "frame");
        assert!(rx_a.try_recv().is_err());
    }

    #[test]
    fn reports_closed_transports() {
        let (a, rx_a) = conn(1, 1);
        let (b, _rx_b) = conn(2, 2);
        drop(rx_a);
        let targets = vec![a.clone(), b];

        let failed = deliver(&targets, "frame", None);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, a.id);
    }

    #[test]
    fn reports_stalled_transports() {
        let (tx, _rx_a) = mpsc::channel(1);
        let a = Arc::new(ChatConnection::new(1, 1, "user-1".into(), "ITN-AAAAA".into(), tx));
        let (b, mut rx_b) = conn(2, 2);
        let targets = vec![a.clone(), b];

        assert!(deliver(&targets, "one", None).is_empty());
        let failed = deliver(&targets, "two", None);

        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, a.id);
        assert_eq!(rx_b.try_recv().unwrap(), "one");
        assert_eq!(rx_b.try_recv().unwrap(), "two");
    }

    #[test]
    fn encode_produces_stable_json() {
        let frame = encode(&ChatNotification::error("ITN-AAAAA", "boom"));
        assert!(frame.contains("\"type\":\"ERROR\""));
        assert!(frame.contains("\"error\":\"boom\""));
    }
}
