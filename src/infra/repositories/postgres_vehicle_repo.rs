use crate::domain::{
    models::{money::Money, vehicle::{Vehicle, VehicleStatus}},
    ports::VehicleRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresVehicleRepo {
    pool: PgPool,
}

impl PostgresVehicleRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for PostgresVehicleRepo {
    async fn create(&self, name: &str, price_per_day: Money, status: VehicleStatus) -> Result<Vehicle, AppError> {
        let now = Utc::now();
        sqlx::query_as::<_, Vehicle>(
            "INSERT INTO vehicles (name, price_per_day, status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5) RETURNING *"
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
            "SELECT * FROM vehicles WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, vehicle: &Vehicle) -> Result<Vehicle, AppError> {
        sqlx::query_as::<_, Vehicle>(
            "UPDATE vehicles SET name=$1, price_per_day=$2, status=$3, updated_at=$4 WHERE id=$5 RETURNING *"
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
