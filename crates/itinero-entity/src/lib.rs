//! # itinero-entity
//!
//! Domain entity models shared across the Itinero backend. All models are
//! serde-serializable with the camelCase wire format the mobile clients
//! expect, and derive `sqlx::FromRow` where they map directly onto a table.

pub mod chat;
pub mod expense;
pub mod itinerary;
pub mod trip;
pub mod user;

pub use chat::{ChatMember, ChatMessage, MessageKind};
pub use trip::Trip;
pub use user::User;
