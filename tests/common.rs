use rental_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::{auth::{Claims, Role}, money::Money, payment::signature_payload, vehicle::VehicleStatus},
    domain::ports::SignatureVerifier,
    infra::factory::{assemble_state, run_sqlite_migrations},
    infra::payment::esewa_signer::EsewaSigner,
    infra::repositories::{sqlite_booking_repo::SqliteBookingRepo, sqlite_vehicle_repo::SqliteVehicleRepo},
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, Response, StatusCode, header},
    Router,
};
use chrono::{NaiveDate, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::str::FromStr;
use tower::ServiceExt;
use serde_json::Value;

pub const TEST_SECRET: &str = "8gBm/:&EnhH.1/q";
pub const TEST_PRODUCT_CODE: &str = "EPAYTEST";
pub const TEST_PUBLIC_URL: &str = "http://rental.test";
pub const TEST_AUDIENCE: &str = "rental-frontend";

pub struct AuthHeaders {
    pub user_id: String,
    pub access_token: String,
    pub csrf_token: String,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        run_sqlite_migrations(&pool).await;

        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let mut config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_public_key: pub_key_pem.to_string(),
            auth_audience: TEST_AUDIENCE.to_string(),
            esewa_base_url: "https://rc-epay.esewa.com.np".to_string(),
            esewa_merchant_id: TEST_PRODUCT_CODE.to_string(),
            esewa_secret_key: TEST_SECRET.to_string(),
            public_url: TEST_PUBLIC_URL.to_string(),
            allow_past_bookings: false,
            pending_ttl_minutes: None,
            sweep_interval_secs: 60,
        };
        customize(&mut config);

        let state = Arc::new(assemble_state(
            &config,
            Arc::new(SqliteBookingRepo::new(pool.clone())),
            Arc::new(SqliteVehicleRepo::new(pool.clone())),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    /// Mints an access token the way the identity service would.
    pub fn login_as(&self, user_id: &str, role: Role) -> AuthHeaders {
        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let now = Utc::now().timestamp() as usize;
        let csrf_token = Uuid::new_v4().simple().to_string();

        let claims = Claims {
            iss: "test-issuer".to_string(),
            sub: user_id.to_string(),
            aud: TEST_AUDIENCE.to_string(),
            exp: now + 3600,
            iat: now,
            role,
            csrf_token: csrf_token.clone(),
        };

        let key = EncodingKey::from_ed_pem(priv_key_pem.as_bytes()).expect("Invalid test private key");
        let access_token = encode(&Header::new(Algorithm::EdDSA), &claims, &key).expect("Failed to sign test token");

        AuthHeaders {
            user_id: user_id.to_string(),
            access_token,
            csrf_token,
        }
    }

    pub fn admin(&self) -> AuthHeaders {
        self.login_as("admin-1", Role::Admin)
    }

    pub fn user(&self, user_id: &str) -> AuthHeaders {
        self.login_as(user_id, Role::User)
    }

    pub async fn request(&self, method: &str, uri: &str, auth: Option<&AuthHeaders>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter())
            .finish();

        self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap()
        ).await.unwrap()
    }

    pub async fn seed_vehicle(&self, price_per_day: &str) -> i64 {
        let price = Money::from_str(price_per_day).expect("Invalid test price");
        self.state.vehicle_repo
            .create("Test Vehicle", price, VehicleStatus::Available)
            .await
            .expect("Failed to seed vehicle")
            .id
    }

    pub async fn create_booking(&self, auth: &AuthHeaders, vehicle_id: i64, start: NaiveDate, end: NaiveDate) -> (StatusCode, Value) {
        self.request("POST", "/api/v1/bookings", Some(auth), Some(serde_json::json!({
            "vehicle_id": vehicle_id,
            "start_date": start.to_string(),
            "end_date": end.to_string(),
        }))).await
    }

    /// Signs a gateway notification with the shared test secret.
    pub fn sign_notification(&self, total_amount: &str, transaction_uuid: &str) -> String {
        let signer = EsewaSigner::new(TEST_SECRET.to_string());
        signer.sign(&signature_payload(total_amount, transaction_uuid, TEST_PRODUCT_CODE))
    }

    pub async fn booking_status(&self, booking_id: i64) -> String {
        sqlx::query_scalar::<_, String>("SELECT status FROM bookings WHERE id = ?")
            .bind(booking_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

#[allow(dead_code)]
pub fn days_from_now(days: i64) -> NaiveDate {
    Utc::now().date_naive() + chrono::Duration::days(days)
}

#[allow(dead_code)]
pub fn location(response: &Response<Body>) -> String {
    response.headers()
        .get(header::LOCATION)
        .expect("No Location header")
        .to_str()
        .unwrap()
        .to_string()
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
