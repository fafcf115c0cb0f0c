//! HTTP-level integration tests, driven through the full router.
//!
//! Every test here talks to a real PostgreSQL database; see `helpers` for
//! how to point the suite at one.

mod helpers;

mod auth_test;
mod chat_test;
mod expense_test;
mod itinerary_test;
mod trip_test;
mod ws_test;
