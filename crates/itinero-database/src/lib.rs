//! # itinero-database
//!
//! PostgreSQL access layer: connection pool management, the migration
//! runner, and one repository per domain.

pub mod connection;
pub mod migration;
pub mod repositories;
