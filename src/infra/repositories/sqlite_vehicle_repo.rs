use crate::domain::{
    models::{money::Money, vehicle::{Vehicle, VehicleStatus}},
    ports::VehicleRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct SqliteVehicleRepo {
    pool: SqlitePool,
}

impl SqliteVehicleRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for SqliteVehicleRepo {
    async fn create(&self, name: &str, price_per_day: Money, status: VehicleStatus) -> Result<Vehicle, AppError> {
        let now = Utc::now();
        sqlx::query_as::<_, Vehicle>(
            "INSERT INTO vehicles (name, price_per_day, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(name)
            .bind(price_per_day)
            .bind(status.as_str())
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Vehicle>, AppError> {
        sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE id = ?",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, vehicle: &Vehicle) -> Result<Vehicle, AppError> {
        sqlx::query_as::<_, Vehicle>(
            "UPDATE vehicles SET name=?, price_per_day=?, status=?, updated_at=? WHERE id=? RETURNING *"
        )
            .bind(&vehicle.name)
            .bind(vehicle.price_per_day)
            .bind(vehicle.status.as_str())
            .bind(Utc::now())
            .bind(vehicle.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Vehicle not found".into()))
    }
}
