use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::{
    requests::{CreateBookingRequest, DateRangeRequest, UpdateBookingStatusRequest},
    responses::AvailabilityResponse,
};
use crate::domain::models::booking::BookingFilter;
use crate::domain::services::booking_service::CreateBooking;
use crate::error::AppError;
use std::sync::Arc;

pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DateRangeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (vehicle_id, start, end) = payload.parse()?;
    let available = state.booking_service.check_availability(vehicle_id, start, end).await?;
    Ok(Json(AvailabilityResponse { available }))
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (vehicle_id, start_date, end_date) = payload.range.parse()?;

    let booking = state.booking_service.create_booking(&requester, CreateBooking {
        vehicle_id,
        start_date,
        end_date,
        on_behalf_of: payload.user_id,
    }).await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Query(filter): Query<BookingFilter>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_service.list_bookings(&requester, filter).await?;
    Ok(Json(bookings))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_service.get_booking(&requester, id).await?;
    Ok(Json(booking))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_service.cancel_booking(&requester, id).await?;
    Ok(Json(booking))
}

pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_service.complete_booking(&requester, id).await?;
    Ok(Json(booking))
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateBookingStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = payload.parse()?;
    let booking = state.booking_service.update_status(&requester, id, status).await?;
    Ok(Json(booking))
}
