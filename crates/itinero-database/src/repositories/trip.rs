//! Trip and membership repository implementation.

use chrono::{NaiveDate, NaiveDateTime};
use rand::Rng;
use sqlx::PgPool;
use tracing::debug;

use itinero_core::error::{AppError, ErrorKind};
use itinero_core::result::AppResult;
use itinero_entity::trip::{Trip, TripMemberInfo};

/// Fields required to create a trip.
#[derive(Debug, Clone)]
pub struct NewTrip {
    /// Destination display name.
    pub destination: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Inclusive day count.
    pub total_days: i32,
    /// Markdown summary.
    pub summary: String,
    /// Accommodation name.
    pub accommodation_name: String,
    /// Accommodation phone.
    pub accommodation_phone: String,
    /// Check-in time.
    pub check_in: NaiveDateTime,
    /// Check-out time.
    pub check_out: NaiveDateTime,
    /// Location name.
    pub location_name: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Reservation code.
    pub reservation_code: String,
    /// Extra location notes.
    pub extra_info: String,
    /// General notes.
    pub additional_info: String,
}

/// Repository for trips and trip membership.
#[derive(Debug, Clone)]
pub struct TripRepository {
    pool: PgPool,
}

impl TripRepository {
    /// Create a new trip repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a trip owned by `owner_id`, generating a unique group code and
    /// enrolling the owner as an accepted member.
    pub async fn create(&self, owner_id: i64, new_trip: &NewTrip) -> AppResult<Trip> {
        // Retry on the (unlikely) group code collision.
        for _ in 0..5 {
            let group_code = generate_group_code();

            let mut tx = self.pool.begin().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
            })?;

            let inserted = sqlx::query_as::<_, Trip>(
                "INSERT INTO trips (owner_id, group_code, destination, start_date, end_date, \
                 total_days, summary, total_members, travel_direction, has_pending_actions, \
                 accommodation_name, accommodation_phone, check_in, check_out, location_name, \
                 latitude, longitude, reservation_code, extra_info, additional_info) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, 1, 'outbound', FALSE, $8, $9, $10, $11, \
                 $12, $13, $14, $15, $16, $17) RETURNING *",
            )
            .bind(owner_id)
            .bind(&group_code)
            .bind(&new_trip.destination)
            .bind(new_trip.start_date)
            .bind(new_trip.end_date)
            .bind(new_trip.total_days)
            .bind(&new_trip.summary)
            .bind(&new_trip.accommodation_name)
            .bind(&new_trip.accommodation_phone)
            .bind(new_trip.check_in)
            .bind(new_trip.check_out)
            .bind(&new_trip.location_name)
            .bind(new_trip.latitude)
            .bind(new_trip.longitude)
            .bind(&new_trip.reservation_code)
            .bind(&new_trip.extra_info)
            .bind(&new_trip.additional_info)
            .fetch_one(&mut *tx)
            .await;

            let trip = match inserted {
                Ok(trip) => trip,
                Err(e) if is_unique_violation(&e) => {
                    debug!(group_code = %group_code, "Group code collision, retrying");
                    continue;
                }
                Err(e) => {
                    return Err(AppError::with_source(
                        ErrorKind::Database,
                        "Failed to create trip",
                        e,
                    ));
                }
            };

            sqlx::query(
                "INSERT INTO trip_members (trip_id, user_id, is_accepted, is_pending) \
                 VALUES ($1, $2, TRUE, FALSE)",
            )
            .bind(trip.id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to enroll trip owner", e)
            })?;

            tx.commit().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to commit trip", e)
            })?;

            return Ok(trip);
        }

        Err(AppError::internal(
            "Could not allocate a unique group code after several attempts",
        ))
    }

    /// Get a trip by id.
    pub async fn find_by_id(&self, trip_id: i64) -> AppResult<Option<Trip>> {
        sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1")
            .bind(trip_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find trip", e))
    }

    /// Resolve a group code to its trip id.
    pub async fn find_id_by_group_code(&self, group_code: &str) -> AppResult<Option<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM trips WHERE group_code = $1")
            .bind(group_code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to resolve group", e))
    }

    /// All trips where the user is the owner or an accepted member,
    /// newest first.
    pub async fn find_all_for_user(&self, user_id: i64) -> AppResult<Vec<Trip>> {
        sqlx::query_as::<_, Trip>(
            "SELECT DISTINCT t.* FROM trips t \
             LEFT JOIN trip_members m ON m.trip_id = t.id \
             WHERE t.owner_id = $1 OR (m.user_id = $1 AND m.is_accepted) \
             ORDER BY t.start_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list trips", e))
    }

    /// Whether the user is an accepted member of the trip.
    pub async fn is_member(&self, user_id: i64, trip_id: i64) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM trip_members \
             WHERE user_id = $1 AND trip_id = $2 AND is_accepted",
        )
        .bind(user_id)
        .bind(trip_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check membership", e))?;
        Ok(count > 0)
    }

    /// Whether the user owns the trip.
    pub async fn is_owner(&self, user_id: i64, trip_id: i64) -> AppResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM trips WHERE id = $1 AND owner_id = $2")
                .bind(trip_id)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to check ownership", e)
                })?;
        Ok(count > 0)
    }

    /// Request membership for a user. Returns `false` when a membership row
    /// (pending or accepted) already exists.
    pub async fn add_member(&self, user_id: i64, trip_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO trip_members (trip_id, user_id, is_accepted, is_pending) \
             VALUES ($1, $2, FALSE, TRUE) ON CONFLICT DO NOTHING",
        )
        .bind(trip_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add member", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Accept a pending member.
    pub async fn accept_member(&self, user_id: i64, trip_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE trip_members SET is_accepted = TRUE, is_pending = FALSE \
             WHERE trip_id = $1 AND user_id = $2",
        )
        .bind(trip_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to accept member", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a member (owner rejection or kick) or let a member leave.
    pub async fn remove_member(&self, user_id: i64, trip_id: i64) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM trip_members WHERE trip_id = $1 AND user_id = $2")
                .bind(trip_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to remove member", e)
                })?;
        Ok(result.rows_affected() > 0)
    }

    /// Accepted members of a trip with identity fields.
    pub async fn members(&self, trip_id: i64) -> AppResult<Vec<TripMemberInfo>> {
        sqlx::query_as::<_, TripMemberInfo>(
            "SELECT u.id, u.name, u.surname, m.is_accepted, m.is_pending \
             FROM trip_members m JOIN users u ON u.id = m.user_id \
             WHERE m.trip_id = $1 AND m.is_accepted ORDER BY u.name",
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list members", e))
    }

    /// Members still awaiting an owner decision.
    pub async fn pending_members(&self, trip_id: i64) -> AppResult<Vec<TripMemberInfo>> {
        sqlx::query_as::<_, TripMemberInfo>(
            "SELECT u.id, u.name, u.surname, m.is_accepted, m.is_pending \
             FROM trip_members m JOIN users u ON u.id = m.user_id \
             WHERE m.trip_id = $1 AND m.is_pending ORDER BY u.name",
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list pending members", e)
        })
    }

    /// Update the accommodation/info section of a trip.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_info(
        &self,
        trip_id: i64,
        accommodation_name: &str,
        accommodation_phone: &str,
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
        location_name: &str,
        latitude: f64,
        longitude: f64,
        reservation_code: &str,
        extra_info: &str,
        additional_info: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE trips SET accommodation_name = $2, accommodation_phone = $3, \
             check_in = $4, check_out = $5, location_name = $6, latitude = $7, \
             longitude = $8, reservation_code = $9, extra_info = $10, additional_info = $11 \
             WHERE id = $1",
        )
        .bind(trip_id)
        .bind(accommodation_name)
        .bind(accommodation_phone)
        .bind(check_in)
        .bind(check_out)
        .bind(location_name)
        .bind(latitude)
        .bind(longitude)
        .bind(reservation_code)
        .bind(extra_info)
        .bind(additional_info)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update trip info", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Update the group-settings section of a trip.
    pub async fn update_group_settings(
        &self,
        trip_id: i64,
        destination: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        summary: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE trips SET destination = $2, start_date = $3, end_date = $4, summary = $5 \
             WHERE id = $1",
        )
        .bind(trip_id)
        .bind(destination)
        .bind(start_date)
        .bind(end_date)
        .bind(summary)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update group settings", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a trip and its dependent rows (cascades in the schema).
    pub async fn delete(&self, trip_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(trip_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete trip", e))?;
        Ok(result.rows_affected() > 0)
    }
}

/// Generate a human-shareable group code: `ITN-` plus five uppercase
/// alphanumerics.
fn generate_group_code() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..5)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("ITN-{suffix}")
}

/// Whether a sqlx error is a unique-constraint violation (Postgres 23505).
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_codes_have_the_shareable_shape() {
        for _ in 0..32 {
            let code = generate_group_code();
            assert_eq!(code.len(), 9);
            assert!(code.starts_with("ITN-"));
            assert!(code[4..]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }
}
