use chrono::NaiveDate;
use crate::domain::models::booking::Booking;
use crate::domain::ports::BookingRepository;
use crate::error::AppError;

pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::Validation("end_date must not be before start_date".into()));
    }
    Ok(())
}

/// A candidate range is free iff no occupying booking shares a calendar day with it.
pub fn is_range_free(existing: &[Booking], start: NaiveDate, end: NaiveDate) -> bool {
    !existing
        .iter()
        .any(|b| b.status.occupies_vehicle() && b.overlaps(start, end))
}

/// Read-only answer to "can this vehicle be booked for `[start, end]`?".
/// The vehicle's existence is the caller's concern.
pub async fn check_availability(
    repo: &dyn BookingRepository,
    vehicle_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<bool, AppError> {
    validate_range(start, end)?;
    let existing = repo.find_active_overlaps(vehicle_id, start, end).await?;
    Ok(is_range_free(&existing, start, end))
}
