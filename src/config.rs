use std::env;

/// One year.
pub const MAX_PENDING_TTL_MINUTES: i64 = 525_600;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_public_key: String, // Ed25519 public key (PEM)
    pub auth_audience: String,
    pub esewa_base_url: String,
    pub esewa_merchant_id: String,
    pub esewa_secret_key: String,
    pub public_url: String,
    pub allow_past_bookings: bool,
    pub pending_ttl_minutes: Option<i64>,
    pub sweep_interval_secs: u64,
}

impl Config {
    /// Loads `.env` (when present) and reads the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            auth_audience: env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "rental-frontend".to_string()),
            esewa_base_url: env::var("ESEWA_BASE_URL").unwrap_or_else(|_| "https://rc-epay.esewa.com.np".to_string()),
            esewa_merchant_id: env::var("ESEWA_MERCHANT_ID").expect("ESEWA_MERCHANT_ID must be set"),
            esewa_secret_key: env::var("ESEWA_SECRET_KEY").expect("ESEWA_SECRET_KEY must be set"),
            public_url: env::var("PUBLIC_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            allow_past_bookings: env::var("ALLOW_PAST_BOOKINGS").map(|v| v == "true" || v == "1").unwrap_or(false),
            pending_ttl_minutes: parse_pending_ttl(env::var("PENDING_BOOKING_TTL_MINUTES").ok().as_deref())
                .expect("Invalid PENDING_BOOKING_TTL_MINUTES"),
            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS").unwrap_or_else(|_| "60".to_string()).parse().expect("SWEEP_INTERVAL_SECS must be a number"),
        }
    }

    pub fn payment_form_url(&self) -> String {
        format!("{}/api/epay/main/v2/form", self.esewa_base_url.trim_end_matches('/'))
    }
}

/// Unset or blank disables expiry. Otherwise a whole number of minutes in
/// `1..=MAX_PENDING_TTL_MINUTES`.
pub fn parse_pending_ttl(raw: Option<&str>) -> Result<Option<i64>, String> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let minutes: i64 = raw.parse()
        .map_err(|_| format!("'{}' is not a whole number of minutes", raw))?;
    if !(1..=MAX_PENDING_TTL_MINUTES).contains(&minutes) {
        return Err(format!("{} is outside 1..={}", minutes, MAX_PENDING_TTL_MINUTES));
    }
    Ok(Some(minutes))
}
