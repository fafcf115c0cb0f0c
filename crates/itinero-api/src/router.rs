//! Route definitions for the Itinero HTTP API.
//!
//! Routes are organized by domain; the chat WebSocket endpoint sits next
//! to the chat REST routes. The router receives `AppState` and passes it
//! to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(auth_routes())
        .merge(trip_routes())
        .merge(chat_routes())
        .merge(expense_routes())
        .merge(itinerary_routes())
        .merge(health_routes())
        .route("/home", get(handlers::home::home))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Account endpoints: register, login, delete account
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/delete-account", post(handlers::auth::delete_account))
}

/// Trip CRUD, membership, and group settings
fn trip_routes() -> Router<AppState> {
    Router::new()
        .route("/trips", post(handlers::trip::create_trip))
        .route("/trips", get(handlers::trip::list_trips))
        .route("/trips/new", post(handlers::trip::create_trip))
        .route("/groups/join", post(handlers::trip::join_group))
        .route("/trips/{groupCode}/join", post(handlers::trip::join_trip))
        .route("/trips/{groupCode}/info", get(handlers::trip::trip_info))
        .route("/trips/{groupCode}/info", put(handlers::trip::update_trip_info))
        .route("/trips/{groupCode}/group", get(handlers::trip::group_settings))
        .route(
            "/trips/{groupCode}/group",
            put(handlers::trip::update_group_settings),
        )
        .route("/trips/{groupCode}/pending", get(handlers::trip::pending_members))
        .route("/trips/{groupCode}/invite", post(handlers::trip::invite_member))
        .route(
            "/trips/{groupCode}/members/{memberId}/accept",
            post(handlers::trip::accept_member),
        )
        .route(
            "/trips/{groupCode}/members/{memberId}",
            delete(handlers::trip::remove_member),
        )
        .route("/trips/{groupCode}/leave", delete(handlers::trip::leave_trip))
        .route("/trips/{groupCode}", delete(handlers::trip::delete_trip))
}

/// Chat REST surface plus the WebSocket upgrade endpoint
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat/groups", get(handlers::chat::list_groups))
        .route(
            "/chat/groups/{groupCode}/messages",
            get(handlers::chat::group_messages),
        )
        .route(
            "/chat/groups/{groupCode}/members",
            get(handlers::chat::group_members),
        )
        .route("/chat/messages/{messageId}", put(handlers::chat::edit_message))
        .route(
            "/chat/messages/{messageId}",
            delete(handlers::chat::delete_message),
        )
        .route("/chat/{groupCode}", get(handlers::ws::chat_upgrade))
}

/// Expense tracking and per-trip summaries
fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", post(handlers::expense::create_expense))
        .route(
            "/trips/{groupCode}/expenses",
            get(handlers::expense::list_expenses),
        )
        .route(
            "/trips/{groupCode}/expenses/summary",
            get(handlers::expense::expense_summary),
        )
        .route(
            "/expenses/{expenseId}/complete",
            post(handlers::expense::complete_expense),
        )
        .route("/expenses/{expenseId}", delete(handlers::expense::delete_expense))
}

/// Itinerary items, keyed by group code
fn itinerary_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/trips/{groupCode}/itinerary",
            get(handlers::itinerary::list_items),
        )
        .route(
            "/trips/{groupCode}/itinerary",
            post(handlers::itinerary::create_item),
        )
        .route(
            "/trips/{groupCode}/itinerary/{itemId}",
            get(handlers::itinerary::get_item),
        )
        .route(
            "/trips/{groupCode}/itinerary/{itemId}",
            put(handlers::itinerary::update_item),
        )
        .route(
            "/trips/{groupCode}/itinerary/{itemId}",
            delete(handlers::itinerary::delete_item),
        )
        .route(
            "/trips/{groupCode}/itinerary/{itemId}/complete",
            post(handlers::itinerary::complete_item),
        )
        .route(
            "/trips/{groupCode}/today-overview",
            get(handlers::itinerary::today_overview),
        )
}

/// Liveness and readiness endpoints
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/ready", get(handlers::health::ready))
}
