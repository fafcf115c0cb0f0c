//! Trip and membership entity models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Direction of the currently relevant travel leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "travel_direction", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelDirection {
    /// Heading to the destination.
    Outbound,
    /// Heading home.
    Return,
}

/// A trip row, flat as stored. Accommodation fields are denormalized onto
/// the trip since every trip has exactly one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    /// Internal numeric id.
    pub id: i64,
    /// Owning user's id.
    pub owner_id: i64,
    /// Human-shareable membership/chat scope code, distinct from `id`.
    pub group_code: String,
    /// Destination display name.
    pub destination: String,
    /// First day of the trip.
    pub start_date: NaiveDate,
    /// Last day of the trip.
    pub end_date: NaiveDate,
    /// Inclusive day count.
    pub total_days: i32,
    /// Markdown trip summary.
    pub summary: String,
    /// Current member count.
    pub total_members: i32,
    /// Current travel leg.
    pub travel_direction: TravelDirection,
    /// Whether any join requests await the owner.
    pub has_pending_actions: bool,
    /// Accommodation name.
    pub accommodation_name: String,
    /// Accommodation phone number.
    pub accommodation_phone: String,
    /// Check-in time.
    pub check_in: NaiveDateTime,
    /// Check-out time.
    pub check_out: NaiveDateTime,
    /// Accommodation location name.
    pub location_name: String,
    /// Location latitude.
    pub latitude: f64,
    /// Location longitude.
    pub longitude: f64,
    /// Booking reservation code.
    pub reservation_code: String,
    /// Extra location notes.
    pub extra_info: String,
    /// General free-form notes.
    pub additional_info: String,
}

/// Membership edge between a user and a trip.
///
/// Join requests start pending and unaccepted; the owner flips them to
/// accepted or deletes the row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TripMember {
    /// Trip id.
    pub trip_id: i64,
    /// Member's user id.
    pub user_id: i64,
    /// Whether the owner has accepted the member.
    pub is_accepted: bool,
    /// Whether the membership still awaits a decision.
    pub is_pending: bool,
}

/// Member listing projection with user identity attached.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TripMemberInfo {
    /// Member's user id.
    pub id: i64,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Whether the owner has accepted the member.
    pub is_accepted: bool,
    /// Whether the membership still awaits a decision.
    pub is_pending: bool,
}
