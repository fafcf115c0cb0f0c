//! # itinero-auth
//!
//! Authentication building blocks for the Itinero backend.
//!
//! ## Modules
//!
//! - `jwt` — bearer token creation and validation
//! - `password` — Argon2id password hashing and verification

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
