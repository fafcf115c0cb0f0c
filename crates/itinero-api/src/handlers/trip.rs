//! Trip and membership endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use validator::Validate;

use itinero_core::error::AppError;
use itinero_database::repositories::trip::NewTrip;
use itinero_entity::trip::{Trip, TripMemberInfo};

use crate::dto::request::{
    CreateTripRequest, InviteRequest, JoinGroupRequest, UpdateGroupSettingsRequest,
    UpdateTripInfoRequest,
};
use crate::dto::response::MessageResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::handlers::{require_trip_access, require_trip_ownership};
use crate::state::AppState;

/// POST /trips
pub async fn create_trip(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateTripRequest>,
) -> ApiResult<(StatusCode, Json<Trip>)> {
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    if request.end_date < request.start_date {
        return Err(AppError::validation("End date precedes start date").into());
    }

    let total_days = (request.end_date - request.start_date).num_days() as i32 + 1;
    let trip = state
        .trip_repo
        .create(
            user.id,
            &NewTrip {
                destination: request.destination,
                start_date: request.start_date,
                end_date: request.end_date,
                total_days,
                summary: request.summary,
                accommodation_name: request.accommodation.name,
                accommodation_phone: request.accommodation.phone,
                check_in: request.accommodation.check_in,
                check_out: request.accommodation.check_out,
                location_name: request.accommodation.location.name,
                latitude: request.accommodation.location.latitude,
                longitude: request.accommodation.location.longitude,
                reservation_code: request.reservation_code,
                extra_info: request.extra_info,
                additional_info: request.additional_info,
            },
        )
        .await?;

    info!(trip_id = trip.id, group_code = %trip.group_code, "Trip created");
    Ok((StatusCode::CREATED, Json(trip)))
}

/// GET /trips
pub async fn list_trips(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Trip>>> {
    Ok(Json(state.trip_repo.find_all_for_user(user.id).await?))
}

/// POST /groups/join — request membership via a shared group code.
pub async fn join_group(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<JoinGroupRequest>,
) -> ApiResult<Json<MessageResponse>> {
    join_by_group_code(&state, user.id, &request.group_code).await
}

/// POST /trips/{groupCode}/join
pub async fn join_trip(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    join_by_group_code(&state, user.id, &group_code).await
}

async fn join_by_group_code(
    state: &AppState,
    user_id: i64,
    group_code: &str,
) -> ApiResult<Json<MessageResponse>> {
    let trip_id = state
        .trip_repo
        .find_id_by_group_code(group_code)
        .await?
        .ok_or_else(|| AppError::not_found("Trip not found"))?;

    if state.trip_repo.is_owner(user_id, trip_id).await? {
        return Err(AppError::conflict("You already own this trip").into());
    }

    let requested = state.trip_repo.add_member(user_id, trip_id).await?;
    if !requested {
        return Err(AppError::conflict("Join request already exists").into());
    }

    info!(user_id, trip_id, "Join requested");
    Ok(Json(MessageResponse::new("Join request sent")))
}

/// GET /trips/{groupCode}/info — accommodation section.
pub async fn trip_info(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
) -> ApiResult<Json<Trip>> {
    let trip = require_trip_access(&state, user.id, &group_code).await?;
    Ok(Json(trip))
}

/// PUT /trips/{groupCode}/info
pub async fn update_trip_info(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
    Json(request): Json<UpdateTripInfoRequest>,
) -> ApiResult<Json<MessageResponse>> {
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let trip = require_trip_ownership(&state, user.id, &group_code).await?;

    state
        .trip_repo
        .update_info(
            trip.id,
            &request.accommodation.name,
            &request.accommodation.phone,
            request.accommodation.check_in,
            request.accommodation.check_out,
            &request.accommodation.location.name,
            request.accommodation.location.latitude,
            request.accommodation.location.longitude,
            &request.reservation_code,
            &request.extra_info,
            &request.additional_info,
        )
        .await?;
    Ok(Json(MessageResponse::new("Trip info updated")))
}

/// GET /trips/{groupCode}/group — group settings section.
pub async fn group_settings(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
) -> ApiResult<Json<Trip>> {
    let trip = require_trip_access(&state, user.id, &group_code).await?;
    Ok(Json(trip))
}

/// PUT /trips/{groupCode}/group
pub async fn update_group_settings(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
    Json(request): Json<UpdateGroupSettingsRequest>,
) -> ApiResult<Json<MessageResponse>> {
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let trip = require_trip_ownership(&state, user.id, &group_code).await?;

    state
        .trip_repo
        .update_group_settings(
            trip.id,
            &request.destination,
            request.start_date,
            request.end_date,
            &request.summary,
        )
        .await?;
    Ok(Json(MessageResponse::new("Group settings updated")))
}

/// GET /trips/{groupCode}/pending — join requests awaiting the owner.
pub async fn pending_members(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
) -> ApiResult<Json<Vec<TripMemberInfo>>> {
    let trip = require_trip_ownership(&state, user.id, &group_code).await?;
    Ok(Json(state.trip_repo.pending_members(trip.id).await?))
}

/// POST /trips/{groupCode}/invite — owner adds a user directly by email.
pub async fn invite_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
    Json(request): Json<InviteRequest>,
) -> ApiResult<Json<MessageResponse>> {
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let trip = require_trip_ownership(&state, user.id, &group_code).await?;

    let invitee = state
        .user_repo
        .find_by_email(&request.email)
        .await?
        .ok_or_else(|| AppError::not_found("No account with that email"))?;

    let added = state.trip_repo.add_member(invitee.id, trip.id).await?;
    if !added {
        return Err(AppError::conflict("User is already in this trip").into());
    }
    state.trip_repo.accept_member(invitee.id, trip.id).await?;

    info!(trip_id = trip.id, invitee = invitee.id, "Member invited");
    Ok(Json(MessageResponse::new("Member added")))
}

/// POST /trips/{groupCode}/members/{memberId}/accept
pub async fn accept_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((group_code, member_id)): Path<(String, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    let trip = require_trip_ownership(&state, user.id, &group_code).await?;

    let accepted = state.trip_repo.accept_member(member_id, trip.id).await?;
    if !accepted {
        return Err(AppError::not_found("No such join request").into());
    }
    Ok(Json(MessageResponse::new("Member accepted")))
}

/// DELETE /trips/{groupCode}/members/{memberId} — reject or kick.
pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((group_code, member_id)): Path<(String, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    let trip = require_trip_ownership(&state, user.id, &group_code).await?;
    if member_id == user.id {
        return Err(AppError::validation("Owners leave by deleting the trip").into());
    }

    let removed = state.trip_repo.remove_member(member_id, trip.id).await?;
    if !removed {
        return Err(AppError::not_found("No such member").into());
    }
    Ok(Json(MessageResponse::new("Member removed")))
}

/// DELETE /trips/{groupCode}/leave — a member leaves voluntarily.
pub async fn leave_trip(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let trip = require_trip_access(&state, user.id, &group_code).await?;
    if trip.owner_id == user.id {
        return Err(AppError::validation("Owners leave by deleting the trip").into());
    }

    state.trip_repo.remove_member(user.id, trip.id).await?;
    info!(trip_id = trip.id, user_id = user.id, "Member left trip");
    Ok(Json(MessageResponse::new("Left the trip")))
}

/// DELETE /trips/{groupCode}
pub async fn delete_trip(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let trip = require_trip_ownership(&state, user.id, &group_code).await?;
    state.trip_repo.delete(trip.id).await?;
    info!(trip_id = trip.id, "Trip deleted");
    Ok(Json(MessageResponse::new("Trip deleted")))
}
