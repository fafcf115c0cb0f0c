//! Response bodies, camelCase on the wire.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use itinero_entity::chat::{ChatMember, ChatMessage};
use itinero_entity::itinerary::ItineraryItem;
use itinero_entity::trip::Trip;

/// Issued on successful register or login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token.
    pub token: String,
    /// The authenticated user's id.
    pub user_id: i64,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
}

/// Generic confirmation body.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// Builds a confirmation body.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// GET /home
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeResponse {
    /// The nearest ongoing or upcoming trip, if any.
    pub current_trip: Option<Trip>,
    /// Every trip visible to the user.
    pub all_trips: Vec<Trip>,
}

/// One entry of GET /chat/groups.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatGroupSummary {
    /// Shareable group code.
    pub group_code: String,
    /// Display name, the trip destination.
    pub group_name: String,
    /// Trip owner.
    pub owner_id: i64,
    /// Group creation time.
    pub created_at: DateTime<Utc>,
    /// Newest message, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<ChatMessage>,
}

/// GET /chat/groups/{groupCode}/members
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembersResponse {
    /// Members with live online flags.
    pub members: Vec<ChatMember>,
}

/// GET /trips/{groupCode}/today-overview
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayOverview {
    /// The day being summarized.
    pub date: NaiveDate,
    /// Items scheduled for that day, in time order.
    pub items: Vec<ItineraryItem>,
}
