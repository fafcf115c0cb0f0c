//! # itinero-api
//!
//! HTTP and WebSocket surface of the Itinero backend, built on Axum.
//!
//! ## Modules
//!
//! - `state` — shared [`state::AppState`] threaded through every handler
//! - `router` — route table plus tower-http layers
//! - `extractors` — bearer-JWT authentication extractor
//! - `dto` — request/response bodies with validation
//! - `handlers` — one module per resource, `ws` for the chat endpoint
//! - `error` — `AppError` → HTTP response mapping

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
