pub mod sqlite_booking_repo;
pub mod sqlite_vehicle_repo;

pub mod postgres_booking_repo;
pub mod postgres_vehicle_repo;
