//! Chat REST endpoints: group listing, history, members, edit/delete.

use axum::extract::{Path, Query, State};
use axum::Json;

use itinero_core::error::AppError;
use itinero_entity::chat::{ChatMember, ChatMessage};

use crate::dto::request::{EditMessageBody, HistoryQuery};
use crate::dto::response::{ChatGroupSummary, GroupMembersResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::handlers::require_trip_access;
use crate::state::AppState;

/// GET /chat/groups — one summary per trip the user belongs to, each with
/// its latest message.
pub async fn list_groups(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<ChatGroupSummary>>> {
    let trips = state.trip_repo.find_all_for_user(user.id).await?;

    let mut groups = Vec::with_capacity(trips.len());
    for trip in trips {
        let last_message = state.chat_repo.last_message(&trip.group_code).await?;
        groups.push(ChatGroupSummary {
            group_code: trip.group_code,
            group_name: trip.destination,
            owner_id: trip.owner_id,
            created_at: chrono::DateTime::from_naive_utc_and_offset(
                trip.start_date.and_time(chrono::NaiveTime::MIN),
                chrono::Utc,
            ),
            last_message,
        });
    }
    Ok(Json(groups))
}

/// GET /chat/groups/{groupCode}/messages?limit=&offset= — paginated
/// history, oldest first within the page.
pub async fn group_messages(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    require_trip_access(&state, user.id, &group_code).await?;

    let limit = query.limit.unwrap_or(state.config.chat.history_limit);
    let offset = query.offset.unwrap_or(0);
    let messages = state.chat_repo.recent(&group_code, limit, offset).await?;
    Ok(Json(messages))
}

/// GET /chat/groups/{groupCode}/members — trip members with live online
/// flags from the connection registry.
pub async fn group_members(
    State(state): State<AppState>,
    user: AuthUser,
    Path(group_code): Path<String>,
) -> ApiResult<Json<GroupMembersResponse>> {
    let trip = require_trip_access(&state, user.id, &group_code).await?;
    let online = state.chat_registry.online_users_in_group(&group_code);

    let members = state
        .trip_repo
        .members(trip.id)
        .await?
        .into_iter()
        .map(|m| ChatMember {
            user_id: m.id,
            user_name: if m.surname.trim().is_empty() {
                m.name
            } else {
                format!("{} {}", m.name, m.surname)
            },
            is_online: online.contains(&m.id),
        })
        .collect();

    Ok(Json(GroupMembersResponse { members }))
}

/// PUT /chat/messages/{messageId} — sender-only edit over HTTP, mirrored to
/// live connections.
pub async fn edit_message(
    State(state): State<AppState>,
    user: AuthUser,
    Path(message_id): Path<i64>,
    Json(body): Json<EditMessageBody>,
) -> ApiResult<Json<ChatMessage>> {
    let edited = state
        .chat_repo
        .edit_if_sender(message_id, user.id, &body.new_message)
        .await?
        .ok_or_else(|| AppError::authorization("Edit failed or not authorized"))?;

    state.chat_registry.broadcast_to_group(
        &edited.group_code,
        &itinero_realtime::protocol::ChatNotification::message_edited(
            &edited.group_code,
            user.id,
            &user.display_name(),
            message_id,
            &body.new_message,
        ),
        Some(user.id),
    );
    Ok(Json(edited))
}

/// DELETE /chat/messages/{messageId} — sender-only delete over HTTP,
/// mirrored to live connections.
pub async fn delete_message(
    State(state): State<AppState>,
    user: AuthUser,
    Path(message_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    // Group code is needed for the live notification, so look the row up
    // before the conditional delete.
    let existing = state
        .chat_repo
        .find_message(message_id)
        .await?
        .ok_or_else(|| AppError::not_found("Message not found"))?;

    let deleted = state
        .chat_repo
        .delete_if_sender(message_id, user.id)
        .await?;
    if !deleted {
        return Err(AppError::authorization("Delete failed or not authorized").into());
    }

    state.chat_registry.broadcast_to_group(
        &existing.group_code,
        &itinero_realtime::protocol::ChatNotification::message_deleted(
            &existing.group_code,
            user.id,
            &user.display_name(),
            message_id,
        ),
        Some(user.id),
    );
    Ok(Json(MessageResponse::new("Message deleted")))
}
