use crate::domain::{
    models::booking::{Booking, BookingFilter, BookingStatus, NewBooking},
    ports::BookingRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use chrono::{DateTime, NaiveDate, Utc};

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Serialises check-then-write per vehicle for the rest of the transaction.
async fn lock_vehicle(tx: &mut Transaction<'_, Postgres>, vehicle_id: i64) -> Result<bool, AppError> {
    let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM vehicles WHERE id = $1 FOR UPDATE")
        .bind(vehicle_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(AppError::Database)?;
    Ok(locked.is_some())
}

async fn has_active_overlap(
    tx: &mut Transaction<'_, Postgres>,
    vehicle_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    exclude_id: Option<i64>,
) -> Result<bool, AppError> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
             SELECT 1 FROM bookings
             WHERE vehicle_id = $1 AND status IN ('pending', 'confirmed')
               AND start_date <= $2 AND end_date >= $3
               AND ($4::BIGINT IS NULL OR id <> $4)
         )"
    )
        .bind(vehicle_id).bind(end).bind(start).bind(exclude_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(AppError::Database)
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create_if_available(&self, booking: &NewBooking) -> Result<Option<Booking>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        if !lock_vehicle(&mut tx, booking.vehicle_id).await? {
            return Err(AppError::NotFound("Vehicle not found".into()));
        }
        if has_active_overlap(&mut tx, booking.vehicle_id, booking.start_date, booking.end_date, None).await? {
            return Ok(None);
        }

        let inserted = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (vehicle_id, user_id, start_date, end_date, total_days, total_cost, status, transaction_uuid, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, NULL, $8, $8)
             RETURNING *"
        )
            .bind(booking.vehicle_id).bind(&booking.user_id).bind(booking.start_date).bind(booking.end_date)
            .bind(booking.total_days).bind(booking.total_cost).bind(booking.status.as_str())
            .bind(booking.created_at)
            .fetch_one(&mut *tx).await;

        let created = match inserted {
            Ok(row) => row,
            // exclusion constraint backstop
            Err(e) if AppError::is_exclusion_violation(&e) => return Ok(None),
            Err(e) => return Err(AppError::Database(e)),
        };

        tx.commit().await.map_err(AppError::Database)?;
        Ok(Some(created))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings
             WHERE ($1::TEXT IS NULL OR user_id = $1) AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC"
        )
            .bind(&filter.user_id).bind(filter.status.map(|s| s.as_str()))
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_active_overlaps(&self, vehicle_id: i64, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE vehicle_id = $1 AND status IN ('pending', 'confirmed') AND start_date <= $2 AND end_date >= $3 ORDER BY start_date ASC"
        )
            .bind(vehicle_id).bind(end).bind(start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_status(&self, id: i64, expected: Option<BookingStatus>, status: BookingStatus) -> Result<Option<Booking>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        if status.occupies_vehicle() {
            let current = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;
            let Some(current) = current else { return Ok(None) };

            lock_vehicle(&mut tx, current.vehicle_id).await?;
            if has_active_overlap(&mut tx, current.vehicle_id, current.start_date, current.end_date, Some(id)).await? {
                return Ok(None);
            }
        }

        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $1, updated_at = $2
             WHERE id = $3 AND ($4::TEXT IS NULL OR status = $4)
             RETURNING *"
        )
            .bind(status.as_str()).bind(Utc::now()).bind(id).bind(expected.map(|s| s.as_str()))
            .fetch_optional(&mut *tx).await;

        let updated = match updated {
            Ok(row) => row,
            Err(e) if AppError::is_exclusion_violation(&e) => return Ok(None),
            Err(e) => return Err(AppError::Database(e)),
        };

        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn claim_payment(&self, id: i64, transaction_uuid: &str) -> Result<Option<Booking>, AppError> {
        let claimed = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'confirmed', transaction_uuid = $1, updated_at = $2
             WHERE id = $3 AND transaction_uuid IS NULL AND status = 'pending'
             RETURNING *"
        )
            .bind(transaction_uuid).bind(Utc::now()).bind(id)
            .fetch_optional(&self.pool).await;

        match claimed {
            Ok(row) => Ok(row),
            Err(e) if AppError::is_unique_violation(&e) => Ok(None),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    async fn complete_finished(&self, today: NaiveDate) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE bookings SET status = 'completed', updated_at = $1 WHERE status = 'confirmed' AND end_date < $2")
            .bind(Utc::now()).bind(today)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn expire_stale_pending(&self, created_before: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE bookings SET status = 'cancelled', updated_at = $1 WHERE status = 'pending' AND transaction_uuid IS NULL AND created_at < $2")
            .bind(Utc::now()).bind(created_before)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
