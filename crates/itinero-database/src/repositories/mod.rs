//! Repository implementations, one per domain.

pub mod chat;
pub mod expense;
pub mod itinerary;
pub mod trip;
pub mod user;
