//! Request bodies, camelCase on the wire.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use itinero_entity::expense::SplitType;

/// POST /auth/register
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Given name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Family name; may be blank.
    #[serde(default)]
    pub surname: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Login email.
    #[validate(email)]
    pub email: String,
    /// Plaintext password, hashed server-side.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// POST /auth/login
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// DELETE /auth/delete-account
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountRequest {
    /// Password confirmation.
    pub password: String,
}

/// Accommodation block of a trip create/update.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AccommodationDto {
    /// Accommodation name.
    pub name: String,
    /// Contact phone.
    #[serde(default)]
    pub phone: String,
    /// Check-in time.
    pub check_in: NaiveDateTime,
    /// Check-out time.
    pub check_out: NaiveDateTime,
    /// Where it is.
    pub location: LocationDto,
}

/// Geographic location block.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDto {
    /// Location display name.
    pub name: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

/// POST /trips
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripRequest {
    /// Destination display name.
    #[validate(length(min = 1, max = 200))]
    pub destination: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Markdown summary.
    #[serde(default)]
    pub summary: String,
    /// Accommodation details.
    #[validate(nested)]
    pub accommodation: AccommodationDto,
    /// Reservation code.
    #[serde(default)]
    pub reservation_code: String,
    /// Extra location notes.
    #[serde(default)]
    pub extra_info: String,
    /// General notes.
    #[serde(default)]
    pub additional_info: String,
}

/// PUT /trips/{groupCode}/info
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTripInfoRequest {
    /// Accommodation details.
    #[validate(nested)]
    pub accommodation: AccommodationDto,
    /// Reservation code.
    #[serde(default)]
    pub reservation_code: String,
    /// Extra location notes.
    #[serde(default)]
    pub extra_info: String,
    /// General notes.
    #[serde(default)]
    pub additional_info: String,
}

/// PUT /trips/{groupCode}/group
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupSettingsRequest {
    /// Destination display name.
    #[validate(length(min = 1, max = 200))]
    pub destination: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Markdown summary.
    #[serde(default)]
    pub summary: String,
}

/// POST /groups/join
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGroupRequest {
    /// Shareable group code.
    pub group_code: String,
}

/// POST /trips/{groupCode}/invite
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    /// Email of the user to invite.
    #[validate(email)]
    pub email: String,
}

/// One debtor share in an expense create.
///
/// `Serialize` is needed because `validator` reports failing `debtors`
/// entries back in its error payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDebtorRequest {
    /// Owing user.
    pub user_id: i64,
    /// Percentage or explicit amount, per split type.
    #[serde(default)]
    pub split_value: f64,
}

/// POST /expenses
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    /// Trip the expense belongs to.
    pub trip_id: i64,
    /// Short description.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Total amount.
    #[validate(range(min = 0.01))]
    pub amount: f64,
    /// Date the expense occurred.
    pub date: NaiveDate,
    /// Free-form category label.
    #[serde(default)]
    pub category: String,
    /// User who fronted the payment.
    pub paid_by_user_id: i64,
    /// Payment method label.
    #[serde(default)]
    pub payment_method: String,
    /// How the amount is divided.
    pub split_type: SplitType,
    /// Optional notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Participants and their shares.
    #[validate(length(min = 1))]
    pub debtors: Vec<CreateDebtorRequest>,
}

/// POST and PUT /trips/{groupCode}/itinerary
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryItemRequest {
    /// Item title.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Scheduled day.
    pub date: NaiveDate,
    /// Scheduled time of day.
    pub time: NaiveTime,
    /// Where the activity takes place.
    #[serde(default)]
    pub location: String,
}

/// PUT /chat/messages/{messageId}
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMessageBody {
    /// Replacement body.
    pub new_message: String,
}

/// Pagination for the chat history endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    /// Page size, highest first.
    pub limit: Option<i64>,
    /// How many newest messages to skip.
    pub offset: Option<i64>,
}
