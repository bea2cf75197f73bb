use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::{money::Money, vehicle::VehicleStatus};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

fn require_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.0.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin privilege required".into()))
    }
}

fn validate_price(price: Money) -> Result<(), AppError> {
    if price <= Money::from(0) {
        return Err(AppError::Validation("price_per_day must be positive".into()));
    }
    if !price.is_storable() {
        return Err(AppError::Validation("price_per_day must have at most 2 decimal places and at most 10 integer digits".into()));
    }
    Ok(())
}

pub async fn create_vehicle(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<CreateVehicleRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&user)?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Vehicle name is required".into()));
    }
    validate_price(payload.price_per_day)?;

    let vehicle = state.vehicle_repo
        .create(name, payload.price_per_day, payload.status.unwrap_or(VehicleStatus::Available))
        .await?;

    info!(vehicle_id = vehicle.id, "Vehicle registered: {}", vehicle.name);
    Ok((StatusCode::CREATED, Json(vehicle)))
}

pub async fn get_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let vehicle = state.vehicle_repo.find_by_id(id).await?
        .ok_or(AppError::NotFound("Vehicle not found".into()))?;
    Ok(Json(vehicle))
}

/// Price changes only affect bookings created afterwards.
pub async fn update_vehicle(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&user)?;

    let mut vehicle = state.vehicle_repo.find_by_id(id).await?
        .ok_or(AppError::NotFound("Vehicle not found".into()))?;

    if let Some(name) = payload.name {
        vehicle.name = name;
    }
    if let Some(price) = payload.price_per_day {
        validate_price(price)?;
        vehicle.price_per_day = price;
    }
    if let Some(status) = payload.status {
        vehicle.status = status;
    }

    let updated = state.vehicle_repo.update(&vehicle).await?;
    info!(vehicle_id = updated.id, price_per_day = %updated.price_per_day, "Vehicle updated");
    Ok(Json(updated))
}
