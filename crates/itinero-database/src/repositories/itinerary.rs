//! Itinerary repository implementation.

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;

use itinero_core::error::{AppError, ErrorKind};
use itinero_core::result::AppResult;
use itinero_entity::itinerary::ItineraryItem;

/// Fields required to create an itinerary item.
#[derive(Debug, Clone)]
pub struct NewItineraryItem {
    /// Group the item belongs to.
    pub group_code: String,
    /// Item title.
    pub name: String,
    /// Longer description.
    pub description: String,
    /// Scheduled day.
    pub date: NaiveDate,
    /// Scheduled time of day.
    pub time: NaiveTime,
    /// Where the activity takes place.
    pub location: String,
}

/// Repository for per-trip itinerary items.
#[derive(Debug, Clone)]
pub struct ItineraryRepository {
    pool: PgPool,
}

impl ItineraryRepository {
    /// Create a new itinerary repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an itinerary item.
    pub async fn create(&self, new_item: &NewItineraryItem) -> AppResult<ItineraryItem> {
        sqlx::query_as::<_, ItineraryItem>(
            "INSERT INTO itinerary_items (group_code, name, description, date, time, location) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&new_item.group_code)
        .bind(&new_item.name)
        .bind(&new_item.description)
        .bind(new_item.date)
        .bind(new_item.time)
        .bind(&new_item.location)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create itinerary item", e)
        })
    }

    /// All items of a group in chronological order.
    pub async fn list_by_group(&self, group_code: &str) -> AppResult<Vec<ItineraryItem>> {
        sqlx::query_as::<_, ItineraryItem>(
            "SELECT * FROM itinerary_items WHERE group_code = $1 ORDER BY date, time, id",
        )
        .bind(group_code)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list itinerary", e))
    }

    /// Get an item by id.
    pub async fn find_by_id(&self, item_id: i64) -> AppResult<Option<ItineraryItem>> {
        sqlx::query_as::<_, ItineraryItem>("SELECT * FROM itinerary_items WHERE id = $1")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find itinerary item", e)
            })
    }

    /// Replace the mutable fields of an item.
    pub async fn update(&self, item_id: i64, updated: &NewItineraryItem) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE itinerary_items SET name = $2, description = $3, date = $4, time = $5, \
             location = $6 WHERE id = $1",
        )
        .bind(item_id)
        .bind(&updated.name)
        .bind(&updated.description)
        .bind(updated.date)
        .bind(updated.time)
        .bind(&updated.location)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update itinerary item", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    /// Toggle the completion flag of an item.
    pub async fn set_completed(&self, item_id: i64, is_completed: bool) -> AppResult<bool> {
        let result =
            sqlx::query("UPDATE itinerary_items SET is_completed = $2 WHERE id = $1")
                .bind(item_id)
                .bind(is_completed)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update completion", e)
                })?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an item.
    pub async fn delete(&self, item_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM itinerary_items WHERE id = $1")
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete itinerary item", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
