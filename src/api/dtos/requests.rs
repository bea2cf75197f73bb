use crate::domain::models::{booking::BookingStatus, money::Money, vehicle::VehicleStatus};
use crate::error::AppError;
use chrono::NaiveDate;
use serde::Deserialize;

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format, expected YYYY-MM-DD".into()))
}

fn missing_fields() -> AppError {
    AppError::Validation("Missing required fields".into())
}

#[derive(Deserialize)]
pub struct CreateVehicleRequest {
    pub name: String,
    pub price_per_day: Money,
    pub status: Option<VehicleStatus>,
}

#[derive(Deserialize)]
pub struct UpdateVehicleRequest {
    pub name: Option<String>,
    pub price_per_day: Option<Money>,
    pub status: Option<VehicleStatus>,
}

/// Vehicle and range, shared by availability checks and booking creation.
#[derive(Deserialize)]
pub struct DateRangeRequest {
    pub vehicle_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRangeRequest {
    pub fn parse(&self) -> Result<(i64, NaiveDate, NaiveDate), AppError> {
        let (Some(vehicle_id), Some(start), Some(end)) = (self.vehicle_id, &self.start_date, &self.end_date) else {
            return Err(missing_fields());
        };
        Ok((vehicle_id, parse_date(start)?, parse_date(end)?))
    }
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    #[serde(flatten)]
    pub range: DateRangeRequest,
    /// Admin only.
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: Option<String>,
}

impl UpdateBookingStatusRequest {
    pub fn parse(&self) -> Result<BookingStatus, AppError> {
        let status = self.status.as_deref().ok_or_else(missing_fields)?;
        status.parse().map_err(AppError::Validation)
    }
}

#[derive(Deserialize)]
pub struct InitiatePaymentRequest {
    pub booking_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct PaymentCallbackQuery {
    pub booking_id: Option<i64>,
}
