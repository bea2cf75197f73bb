use crate::domain::models::{
    booking::{Booking, BookingFilter, BookingStatus, NewBooking},
    money::Money,
    vehicle::{Vehicle, VehicleStatus},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn create(&self, name: &str, price_per_day: Money, status: VehicleStatus) -> Result<Vehicle, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Vehicle>, AppError>;
    async fn update(&self, vehicle: &Vehicle) -> Result<Vehicle, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts the booking only if no pending/confirmed booking of the same vehicle
    /// overlaps its range, atomically. `None` means the range was taken.
    async fn create_if_available(&self, booking: &NewBooking) -> Result<Option<Booking>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Booking>, AppError>;
    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError>;
    /// Pending/confirmed bookings of the vehicle whose closed range touches `[start, end]`.
    async fn find_active_overlaps(&self, vehicle_id: i64, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>, AppError>;
    /// Sets the status, only while the row still has `expected` status when given.
    /// Moving into pending/confirmed re-checks overlap atomically. `None` means the
    /// guard failed: status changed underneath, or another active booking holds the range.
    async fn update_status(&self, id: i64, expected: Option<BookingStatus>, status: BookingStatus) -> Result<Option<Booking>, AppError>;
    /// Compare-and-swap claim: confirms the booking and attaches the transaction only
    /// while it is pending and unclaimed. `None` when nothing was claimed.
    async fn claim_payment(&self, id: i64, transaction_uuid: &str) -> Result<Option<Booking>, AppError>;
    async fn complete_finished(&self, today: NaiveDate) -> Result<u64, AppError>;
    async fn expire_stale_pending(&self, created_before: DateTime<Utc>) -> Result<u64, AppError>;
}

/// Trust boundary with the payment gateway.
pub trait SignatureVerifier: Send + Sync {
    fn sign(&self, payload: &str) -> String;
    fn verify(&self, payload: &str, signature: &str) -> bool;
}
