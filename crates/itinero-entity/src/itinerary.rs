//! Itinerary entity model.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A planned activity on a trip's itinerary, scoped by group code like the
/// chat subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryItem {
    /// Item id.
    pub id: i64,
    /// Trip scope.
    pub group_code: String,
    /// Activity name.
    pub name: String,
    /// Longer description.
    pub description: String,
    /// Day of the activity.
    pub date: NaiveDate,
    /// Start time of the activity.
    pub time: NaiveTime,
    /// Location display name.
    pub location: String,
    /// Whether the activity already happened / was checked off.
    pub is_completed: bool,
}
