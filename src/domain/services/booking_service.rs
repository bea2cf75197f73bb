use std::sync::Arc;
use chrono::{Duration, NaiveDate, Utc};
use tracing::{info, warn};
use crate::domain::{
    models::{
        auth::Requester,
        booking::{Booking, BookingFilter, BookingStatus, NewBooking, NewBookingParams},
    },
    ports::{BookingRepository, VehicleRepository},
    services::availability::{check_availability, validate_range},
};
use crate::error::AppError;

pub struct CreateBooking {
    pub vehicle_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Admins may book on behalf of another user.
    pub on_behalf_of: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub completed: u64,
    pub expired: u64,
}

pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    vehicles: Arc<dyn VehicleRepository>,
    allow_past_bookings: bool,
}

impl BookingService {
    pub fn new(bookings: Arc<dyn BookingRepository>, vehicles: Arc<dyn VehicleRepository>, allow_past_bookings: bool) -> Self {
        Self { bookings, vehicles, allow_past_bookings }
    }

    pub async fn check_availability(&self, vehicle_id: i64, start: NaiveDate, end: NaiveDate) -> Result<bool, AppError> {
        self.vehicles.find_by_id(vehicle_id).await?
            .ok_or(AppError::NotFound("Vehicle not found".into()))?;

        check_availability(self.bookings.as_ref(), vehicle_id, start, end).await
    }

    pub async fn create_booking(&self, requester: &Requester, req: CreateBooking) -> Result<Booking, AppError> {
        validate_range(req.start_date, req.end_date)?;

        if !self.allow_past_bookings && req.start_date < Utc::now().date_naive() {
            return Err(AppError::Validation("Cannot book in the past".into()));
        }

        let user_id = match req.on_behalf_of {
            Some(other) if other != requester.user_id => {
                if !requester.is_admin() {
                    return Err(AppError::Forbidden("Cannot book on behalf of another user".into()));
                }
                other
            }
            _ => requester.user_id.clone(),
        };

        let vehicle = self.vehicles.find_by_id(req.vehicle_id).await?
            .ok_or(AppError::NotFound("Vehicle not found".into()))?;

        let booking = NewBooking::new(NewBookingParams {
            vehicle_id: vehicle.id,
            user_id,
            start_date: req.start_date,
            end_date: req.end_date,
            price_per_day: vehicle.price_per_day,
        })?;

        match self.bookings.create_if_available(&booking).await? {
            Some(created) => {
                info!(
                    booking_id = created.id,
                    vehicle_id = created.vehicle_id,
                    total_cost = %created.total_cost,
                    "Booking created: {} -> {}", created.start_date, created.end_date
                );
                Ok(created)
            }
            None => {
                warn!(vehicle_id = booking.vehicle_id, "Booking rejected: {} -> {} overlaps an active booking", booking.start_date, booking.end_date);
                Err(AppError::booking_conflict())
            }
        }
    }

    pub async fn get_booking(&self, requester: &Requester, id: i64) -> Result<Booking, AppError> {
        let booking = self.load(id).await?;
        if !requester.may_act_for(&booking.user_id) {
            return Err(AppError::Forbidden("Not allowed to view this booking".into()));
        }
        Ok(booking)
    }

    pub async fn list_bookings(&self, requester: &Requester, mut filter: BookingFilter) -> Result<Vec<Booking>, AppError> {
        if !requester.is_admin() {
            filter.user_id = Some(requester.user_id.clone());
        }
        self.bookings.list(&filter).await
    }

    /// Owner or admin cancellation. Completed bookings stay completed, and a
    /// confirmed booking can only be cancelled before its rental starts.
    pub async fn cancel_booking(&self, requester: &Requester, id: i64) -> Result<Booking, AppError> {
        let booking = self.load(id).await?;

        if !requester.may_act_for(&booking.user_id) {
            return Err(AppError::Forbidden("Not allowed to cancel this booking".into()));
        }

        match booking.status {
            BookingStatus::Cancelled => return Ok(booking),
            BookingStatus::Completed => {
                return Err(AppError::InvalidState("A completed booking cannot be cancelled".into()));
            }
            BookingStatus::Confirmed if Utc::now().date_naive() >= booking.start_date => {
                return Err(AppError::InvalidState("The rental has already started".into()));
            }
            _ => {}
        }

        let cancelled = self.transition(&booking, BookingStatus::Cancelled).await?;
        info!(booking_id = cancelled.id, cancelled_by = %requester.user_id, "Booking cancelled");
        Ok(cancelled)
    }

    pub async fn complete_booking(&self, requester: &Requester, id: i64) -> Result<Booking, AppError> {
        if !requester.is_admin() {
            return Err(AppError::Forbidden("Admin privilege required".into()));
        }
        let booking = self.load(id).await?;
        let completed = self.transition(&booking, BookingStatus::Completed).await?;
        info!(booking_id = completed.id, "Booking completed");
        Ok(completed)
    }

    /// Operator escape hatch: any status to any status. Re-activating a booking
    /// still cannot double-book its vehicle.
    pub async fn update_status(&self, requester: &Requester, id: i64, status: BookingStatus) -> Result<Booking, AppError> {
        if !requester.is_admin() {
            return Err(AppError::Forbidden("Admin privilege required".into()));
        }

        let booking = self.load(id).await?;
        if booking.status == status {
            return Ok(booking);
        }

        let updated = self.bookings.update_status(id, None, status).await?
            .ok_or_else(AppError::booking_conflict)?;

        info!(booking_id = id, from = %booking.status, to = %status, "Booking status overridden by admin");
        Ok(updated)
    }

    pub async fn run_sweep(&self, pending_ttl: Option<Duration>) -> Result<SweepReport, AppError> {
        let now = Utc::now();
        let completed = self.bookings.complete_finished(now.date_naive()).await?;
        let expired = match pending_ttl {
            Some(ttl) if ttl >= Duration::zero() => {
                let cutoff = now.checked_sub_signed(ttl)
                    .ok_or(AppError::Validation("Pending booking TTL is out of range".into()))?;
                self.bookings.expire_stale_pending(cutoff).await?
            }
            Some(_) => return Err(AppError::Validation("Pending booking TTL must not be negative".into())),
            None => 0,
        };
        Ok(SweepReport { completed, expired })
    }

    async fn load(&self, id: i64) -> Result<Booking, AppError> {
        self.bookings.find_by_id(id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))
    }

    async fn transition(&self, booking: &Booking, to: BookingStatus) -> Result<Booking, AppError> {
        if !booking.status.can_transition_to(to) {
            return Err(AppError::InvalidState(format!(
                "Cannot move booking from {} to {}", booking.status, to
            )));
        }

        self.bookings.update_status(booking.id, Some(booking.status), to).await?
            .ok_or(AppError::InvalidState("Booking was modified concurrently, please retry".into()))
    }
}
