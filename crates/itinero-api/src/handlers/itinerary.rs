//! Itinerary endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use validator::Validate;

use itinero_core::error::AppError;
use itinero_database::repositories::itinerary::NewItineraryItem;
use itinero_entity::itinerary::ItineraryItem;

use crate::dto::request::ItineraryItemRequest;
use crate::dto::response::{MessageResponse, TodayOverview};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::handlers::require_trip_access;
use crate::state::AppState;

/// GET /trips/{groupCode}/itinerary
pub async fn list_items(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
) -> ApiResult<Json<Vec<ItineraryItem>>> {
    require_trip_access(&state, user.id, &group_code).await?;
    Ok(Json(state.itinerary_repo.list_by_group(&group_code).await?))
}

/// POST /trips/{groupCode}/itinerary
pub async fn create_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
    Json(request): Json<ItineraryItemRequest>,
) -> ApiResult<(StatusCode, Json<ItineraryItem>)> {
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    require_trip_access(&state, user.id, &group_code).await?;

    let item = state
        .itinerary_repo
        .create(&new_item(&group_code, request))
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /trips/{groupCode}/itinerary/{itemId}
pub async fn get_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((group_code, item_id)): Path<(String, i64)>,
) -> ApiResult<Json<ItineraryItem>> {
    require_trip_access(&state, user.id, &group_code).await?;
    let item = find_in_group(&state, &group_code, item_id).await?;
    Ok(Json(item))
}

/// PUT /trips/{groupCode}/itinerary/{itemId}
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((group_code, item_id)): Path<(String, i64)>,
    Json(request): Json<ItineraryItemRequest>,
) -> ApiResult<Json<MessageResponse>> {
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    require_trip_access(&state, user.id, &group_code).await?;
    find_in_group(&state, &group_code, item_id).await?;

    state
        .itinerary_repo
        .update(item_id, &new_item(&group_code, request))
        .await?;
    Ok(Json(MessageResponse::new("Itinerary item updated")))
}

/// DELETE /trips/{groupCode}/itinerary/{itemId}
pub async fn delete_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((group_code, item_id)): Path<(String, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    require_trip_access(&state, user.id, &group_code).await?;
    find_in_group(&state, &group_code, item_id).await?;

    state.itinerary_repo.delete(item_id).await?;
    Ok(Json(MessageResponse::new("Itinerary item deleted")))
}

/// POST /trips/{groupCode}/itinerary/{itemId}/complete
pub async fn complete_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((group_code, item_id)): Path<(String, i64)>,
) -> ApiResult<Json<MessageResponse>> {
    require_trip_access(&state, user.id, &group_code).await?;
    find_in_group(&state, &group_code, item_id).await?;

    state.itinerary_repo.set_completed(item_id, true).await?;
    Ok(Json(MessageResponse::new("Itinerary item completed")))
}

/// GET /trips/{groupCode}/today-overview
pub async fn today_overview(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
) -> ApiResult<Json<TodayOverview>> {
    require_trip_access(&state, user.id, &group_code).await?;

    let today = Utc::now().date_naive();
    let items = state
        .itinerary_repo
        .list_by_group(&group_code)
        .await?
        .into_iter()
        .filter(|item| item.date == today)
        .collect();

    Ok(Json(TodayOverview { date: today, items }))
}

fn new_item(group_code: &str, request: ItineraryItemRequest) -> NewItineraryItem {
    NewItineraryItem {
        group_code: group_code.to_string(),
        name: request.name,
        description: request.description,
        date: request.date,
        time: request.time,
        location: request.location,
    }
}

/// Item ids are global; make sure this one belongs to the addressed group.
async fn find_in_group(
    state: &AppState,
    group_code: &str,
    item_id: i64,
) -> ApiResult<ItineraryItem> {
    let item = state
        .itinerary_repo
        .find_by_id(item_id)
        .await?
        .filter(|item| item.group_code == group_code)
        .ok_or_else(|| AppError::not_found("Itinerary item not found"))?;
    Ok(item)
}
