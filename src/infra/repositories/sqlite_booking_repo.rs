use crate::domain::{
    models::booking::{Booking, BookingFilter, BookingStatus, NewBooking},
    ports::BookingRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::{DateTime, NaiveDate, Utc};

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// SQLite runs one writer at a time, so each guarded statement below checks and
// writes atomically without an explicit lock.
#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn create_if_available(&self, booking: &NewBooking) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (vehicle_id, user_id, start_date, end_date, total_days, total_cost, status, transaction_uuid, created_at, updated_at)
             SELECT ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?
             WHERE NOT EXISTS (
                 SELECT 1 FROM bookings
                 WHERE vehicle_id = ? AND status IN ('pending', 'confirmed')
                   AND start_date <= ? AND end_date >= ?
             )
             RETURNING *"
        )
            .bind(booking.vehicle_id).bind(&booking.user_id).bind(booking.start_date).bind(booking.end_date)
            .bind(booking.total_days).bind(booking.total_cost).bind(booking.status.as_str())
            .bind(booking.created_at).bind(booking.created_at)
            .bind(booking.vehicle_id).bind(booking.end_date).bind(booking.start_date)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
        let status = filter.status.map(|s| s.as_str());
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings
             WHERE (? IS NULL OR user_id = ?) AND (? IS NULL OR status = ?)
             ORDER BY created_at DESC, id DESC"
        )
            .bind(&filter.user_id).bind(&filter.user_id)
            .bind(status).bind(status)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_active_overlaps(&self, vehicle_id: i64, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE vehicle_id = ? AND status IN ('pending', 'confirmed') AND start_date <= ? AND end_date >= ? ORDER BY start_date ASC"
        )
            .bind(vehicle_id).bind(end).bind(start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_status(&self, id: i64, expected: Option<BookingStatus>, status: BookingStatus) -> Result<Option<Booking>, AppError> {
        let expected = expected.map(|s| s.as_str());
        let activating = status.occupies_vehicle();
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = ?, updated_at = ?
             WHERE id = ?
               AND (? IS NULL OR status = ?)
               AND (? = 0 OR NOT EXISTS (
                   SELECT 1 FROM bookings AS other
                   WHERE other.vehicle_id = bookings.vehicle_id
                     AND other.id != bookings.id
                     AND other.status IN ('pending', 'confirmed')
                     AND other.start_date <= bookings.end_date
                     AND other.end_date >= bookings.start_date
               ))
             RETURNING *"
        )
            .bind(status.as_str()).bind(Utc::now())
            .bind(id)
            .bind(expected).bind(expected)
            .bind(activating)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn claim_payment(&self, id: i64, transaction_uuid: &str) -> Result<Option<Booking>, AppError> {
        let claimed = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'confirmed', transaction_uuid = ?, updated_at = ?
             WHERE id = ? AND transaction_uuid IS NULL AND status = 'pending'
             RETURNING *"
        )
            .bind(transaction_uuid).bind(Utc::now()).bind(id)
            .fetch_optional(&self.pool).await;

        match claimed {
            Ok(row) => Ok(row),
            // transaction uuid already attached to another booking
            Err(e) if AppError::is_unique_violation(&e) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    async fn complete_finished(&self, today: NaiveDate) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE bookings SET status = 'completed', updated_at = ? WHERE status = 'confirmed' AND end_date < ?")
            .bind(Utc::now()).bind(today)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn expire_stale_pending(&self, created_before: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE bookings SET status = 'cancelled', updated_at = ? WHERE status = 'pending' AND transaction_uuid IS NULL AND created_at < ?")
            .bind(Utc::now()).bind(created_before)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
