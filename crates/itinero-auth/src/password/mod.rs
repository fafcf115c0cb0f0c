//! Argon2id password hashing.

mod hasher;

pub use hasher::PasswordHasher;
