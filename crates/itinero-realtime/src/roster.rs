//! Connection roster — tracks active connections indexed by group and by user.

use std::sync::Arc;

use dashmap::DashMap;

use crate::connection::ChatConnection;

/// Thread-safe roster of all active chat connections.
///
/// Both maps hold only non-empty vectors: the last removal for a key also
/// removes the key. All reads hand out point-in-time snapshots so no caller
/// ever performs I/O while a map guard is held.
#[derive(Debug, Default)]
pub struct ChatRoster {
    /// Group code → connections currently attached to that group.
    by_group: DashMap<String, Vec<Arc<ChatConnection>>>,
    /// User ID → that user's connections across all groups.
    by_user: DashMap<i64, Vec<Arc<ChatConnection>>>,
}

impl ChatRoster {
    /// Creates a new empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to both indexes.
    pub fn insert(&self, conn: Arc<ChatConnection>) {
        self.by_group
            .entry(conn.group_code.clone())
            .or_default()
            .push(conn.clone());
        self.by_user.entry(conn.user_id).or_default().push(conn);
    }

    /// Removes a connection from both indexes. Returns `false` when the
    /// connection was not present (making removal idempotent).
    pub fn remove(&self, conn: &ChatConnection) -> bool {
        let mut removed = false;

        if let Some(mut entry) = self.by_group.get_mut(&conn.group_code) {
            let before = entry.len();
            entry.retain(|c| c.id != conn.id);
            removed = entry.len() < before;
            let empty = entry.is_empty();
            drop(entry);
            if empty {
                self.by_group.remove_if(&conn.group_code, |_, v| v.is_empty());
            }
        }

        if let Some(mut entry) = self.by_user.get_mut(&conn.user_id) {
            entry.retain(|c| c.id != conn.id);
            let empty = entry.is_empty();
            drop(entry);
            if empty {
                self.by_user.remove_if(&conn.user_id, |_, v| v.is_empty());
            }
        }

        removed
    }

    /// Snapshot of all connections attached to a group.
    pub fn group_snapshot(&self, group_code: &str) -> Vec<Arc<ChatConnection>> {
        self.by_group
            .get(group_code)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Snapshot of all connections owned by a user.
    pub fn user_snapshot(&self, user_id: i64) -> Vec<Arc<ChatConnection>> {
        self.by_user
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Whether the user still has at least one connection in the group.
    pub fn user_in_group(&self, user_id: i64, group_code: &str) -> bool {
        self.by_group
            .get(group_code)
            .map(|entry| entry.iter().any(|c| c.user_id == user_id))
            .unwrap_or(false)
    }

    /// Whether the user has any connection at all.
    pub fn is_online(&self, user_id: i64) -> bool {
        self.by_user.contains_key(&user_id)
    }

    /// Distinct user IDs with at least one connection in the group.
    pub fn online_users(&self, group_code: &str) -> Vec<i64> {
        let mut users: Vec<i64> = self
            .by_group
            .get(group_code)
            .map(|entry| entry.iter().map(|c| c.user_id).collect())
            .unwrap_or_default();
        users.sort_unstable();
        users.dedup();
        users
    }

    /// Number of connections attached to a group.
    pub fn connection_count(&self, group_code: &str) -> usize {
        self.by_group
            .get(group_code)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    /// Total number of connections across all groups.
    pub fn total_connections(&self) -> usize {
        self.by_group.iter().map(|entry| entry.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn conn(seq: u64, user_id: i64, group: &str) -> Arc<ChatConnection> {
        let (tx, rx) = mpsc::channel(4);
        std::mem::forget(rx);
        Arc::new(ChatConnection::new(
            seq,
            user_id,
            format!("user-{user_id}"),
            group.into(),
            tx,
        ))
    }

    #[test]
    fn insert_and_snapshot_by_group_and_user() {
        let roster = ChatRoster::new();
        let a = conn(1, 1, "ITN-AAAAA");
        let b = conn(2, 2, "ITN-AAAAA");
        roster.insert(a.clone());
        roster.insert(b.clone());

        assert_eq!(roster.group_snapshot("ITN-AAAAA").len(), 2);
        assert_eq!(roster.user_snapshot(1).len(), 1);
        assert!(roster.is_online(1));
        assert_eq!(roster.online_users("ITN-AAAAA"), vec![1, 2]);
        assert_eq!(roster.total_connections(), 2);
    }

    #[test]
    fn last_removal_prunes_the_key() {
        let roster = ChatRoster::new();
        let a = conn(1, 1, "ITN-AAAAA");
        roster.insert(a.clone());

        assert!(roster.remove(&a));
        assert!(roster.group_snapshot("ITN-AAAAA").is_empty());
        assert!(!roster.is_online(1));
        assert_eq!(roster.total_connections(), 0);
    }

    #[test]
    fn remove_is_idempotent() {
        let roster = ChatRoster::new();
        let a = conn(1, 1, "ITN-AAAAA");
        roster.insert(a.clone());

        assert!(roster.remove(&a));
        assert!(!roster.remove(&a));
    }

    #[test]
    fn multi_device_user_stays_in_group_until_last_connection_goes() {
        let roster = ChatRoster::new();
        let phone = conn(1, 1, "ITN-AAAAA");
        let laptop = conn(2, 1, "ITN-AAAAA");
        roster.insert(phone.clone());
        roster.insert(laptop.clone());

        roster.remove(&phone);
        assert!(roster.user_in_group(1, "ITN-AAAAA"));

        roster.remove(&laptop);
        assert!(!roster.user_in_group(1, "ITN-AAAAA"));
    }

    #[test]
    fn online_users_deduplicates_multi_device_users() {
        let roster = ChatRoster::new();
        roster.insert(conn(1, 7, "ITN-AAAAA"));
        roster.insert(conn(2, 7, "ITN-AAAAA"));
        roster.insert(conn(3, 9, "ITN-AAAAA"));

        assert_eq!(roster.online_users("ITN-AAAAA"), vec![7, 9]);
        assert_eq!(roster.connection_count("ITN-AAAAA"), 3);
    }
}
