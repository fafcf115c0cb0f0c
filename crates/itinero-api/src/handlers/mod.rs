//! HTTP and WebSocket handlers, one module per resource.

pub mod auth;
pub mod chat;
pub mod expense;
pub mod health;
pub mod home;
pub mod itinerary;
pub mod trip;
pub mod ws;

use itinero_core::error::AppError;
use itinero_entity::trip::Trip;

use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves a group code to its trip and checks the user may act on it.
/// Used by every group-scoped endpoint and the WebSocket handshake.
pub(crate) async fn require_trip_access(
    state: &AppState,
    user_id: i64,
    group_code: &str,
) -> ApiResult<Trip> {
    let trip_id = state
        .trip_repo
        .find_id_by_group_code(group_code)
        .await?
        .ok_or_else(|| AppError::not_found("Trip not found"))?;

    let allowed = state.trip_repo.is_member(user_id, trip_id).await?
        || state.trip_repo.is_owner(user_id, trip_id).await?;
    if !allowed {
        return Err(AppError::authorization("Access denied to group").into());
    }

    let trip = state
        .trip_repo
        .find_by_id(trip_id)
        .await?
        .ok_or_else(|| AppError::not_found("Trip not found"))?;
    Ok(trip)
}

/// Like [`require_trip_access`] but additionally requires ownership.
pub(crate) async fn require_trip_ownership(
    state: &AppState,
    user_id: i64,
    group_code: &str,
) -> ApiResult<Trip> {
    let trip = require_trip_access(state, user_id, group_code).await?;
    if trip.owner_id != user_id {
        return Err(AppError::authorization("Only the trip owner may do this").into());
    }
    Ok(trip)
}
