use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{BookingRepository, VehicleRepository};
use crate::domain::services::{
    booking_service::BookingService,
    payment_service::{PaymentService, PaymentSettings},
};
use crate::infra::payment::esewa_signer::EsewaSigner;
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_vehicle_repo::PostgresVehicleRepo,
    sqlite_booking_repo::SqliteBookingRepo, sqlite_vehicle_repo::SqliteVehicleRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        assemble_state(
            config,
            Arc::new(PostgresBookingRepo::new(pool.clone())),
            Arc::new(PostgresVehicleRepo::new(pool)),
        )
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true)
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        assemble_state(
            config,
            Arc::new(SqliteBookingRepo::new(pool.clone())),
            Arc::new(SqliteVehicleRepo::new(pool)),
        )
    }
}

/// Wires services over already-built repositories. Tests use this directly.
pub fn assemble_state(
    config: &Config,
    booking_repo: Arc<dyn BookingRepository>,
    vehicle_repo: Arc<dyn VehicleRepository>,
) -> AppState {
    let signer = Arc::new(EsewaSigner::new(config.esewa_secret_key.clone()));

    let booking_service = Arc::new(BookingService::new(
        booking_repo.clone(),
        vehicle_repo.clone(),
        config.allow_past_bookings,
    ));
    let payment_service = Arc::new(PaymentService::new(
        booking_repo,
        signer,
        PaymentSettings {
            product_code: config.esewa_merchant_id.clone(),
            payment_url: config.payment_form_url(),
            public_url: config.public_url.clone(),
        },
    ));

    AppState {
        config: config.clone(),
        vehicle_repo,
        booking_service,
        payment_service,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
