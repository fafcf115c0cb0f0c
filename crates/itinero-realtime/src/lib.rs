//! # itinero-realtime
//!
//! Real-time group chat engine for the Itinero backend. Provides:
//!
//! - Per-connection handles carrying an mpsc transport sender
//! - A thread-safe roster of connections indexed by group and by user
//! - Best-effort fan-out with removal of dead connections on send failure
//! - The group chat wire protocol (tagged notifications, typed payloads)
//! - A per-connection dispatcher handling each inbound frame in order

pub mod broadcast;
pub mod connection;
pub mod dispatcher;
pub mod protocol;
pub mod registry;
pub mod roster;
pub mod store;

pub use connection::{ChatConnection, ConnectionId};
pub use dispatcher::ChatDispatcher;
pub use protocol::{ChatAction, ChatNotification, Envelope};
pub use registry::ChatRegistry;
pub use store::MessageStore;
