use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

// 2067 = SQLite unique constraint, 23505 = PostgreSQL unique violation
const UNIQUE_VIOLATION_CODES: [&str; 2] = ["2067", "23505"];
// 23P01 = PostgreSQL exclusion violation (booking range overlap)
const EXCLUSION_VIOLATION_CODE: &str = "23P01";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid payment signature")]
    InvalidSignature,
    #[error("No matching booking for payment")]
    NoMatchingBooking,
    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn is_unique_violation(e: &sqlx::Error) -> bool {
        e.as_database_error()
            .and_then(|db_err| db_err.code())
            .is_some_and(|code| UNIQUE_VIOLATION_CODES.iter().any(|c| *c == code))
    }

    pub fn is_exclusion_violation(e: &sqlx::Error) -> bool {
        e.as_database_error()
            .and_then(|db_err| db_err.code())
            .is_some_and(|code| code == EXCLUSION_VIOLATION_CODE)
    }

    pub fn booking_conflict() -> Self {
        AppError::Conflict("Vehicle is already booked for the selected dates".into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if AppError::is_exclusion_violation(e) {
                    return AppError::booking_conflict().into_response();
                }
                if AppError::is_unique_violation(e) {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "error": "Resource already exists (duplicate entry)" }))
                    ).into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error, please try again".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::InvalidState(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidSignature => (StatusCode::BAD_REQUEST, "Invalid payment signature".to_string()),
            AppError::NoMatchingBooking => (StatusCode::CONFLICT, "No matching booking for payment".to_string()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
