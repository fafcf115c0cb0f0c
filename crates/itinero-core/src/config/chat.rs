//! Real-time chat engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) chat configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Closes a connection after this many seconds without activity.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Interval between server-initiated keepalive pings, in seconds.
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval_seconds: u64,
    /// Number of recent messages pushed to a newly joined connection.
    #[serde(default = "default_history_limit")]
    pub history_limit: i64,
    /// Per-connection outbound send buffer size (frames).
    #[serde(default = "default_send_buffer")]
    pub send_buffer_size: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            idle_timeout_seconds: default_idle_timeout(),
            keepalive_interval_seconds: default_keepalive_interval(),
            history_limit: default_history_limit(),
            send_buffer_size: default_send_buffer(),
        }
    }
}

fn default_idle_timeout() -> u64 {
    30
}

fn default_keepalive_interval() -> u64 {
    15
}

fn default_history_limit() -> i64 {
    50
}

fn default_send_buffer() -> usize {
    64
}
