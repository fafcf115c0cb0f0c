//! Home screen endpoint.

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::dto::response::HomeResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /home — the user's trips plus the nearest current or upcoming one.
pub async fn home(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<HomeResponse>> {
    let all_trips = state.trip_repo.find_all_for_user(user.id).await?;

    let today = Utc::now().date_naive();
    // Ongoing trip wins; otherwise the soonest upcoming one.
    let current_trip = all_trips
        .iter()
        .find(|t| t.start_date <= today && today <= t.end_date)
        .or_else(|| {
            all_trips
                .iter()
                .filter(|t| t.start_date > today)
                .min_by_key(|t| t.start_date)
        })
        .cloned();

    Ok(Json(HomeResponse {
        current_trip,
        all_trips,
    }))
}
