use axum::{extract::{State, Query, Form, rejection::FormRejection}, response::{IntoResponse, Redirect}, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{InitiatePaymentRequest, PaymentCallbackQuery};
use crate::domain::models::payment::PaymentNotification;
use crate::error::AppError;
use std::sync::Arc;
use tracing::warn;

pub async fn initiate_payment(
    State(state): State<Arc<AppState>>,
    AuthUser(requester): AuthUser,
    Json(payload): Json<InitiatePaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking_id = payload.booking_id
        .ok_or(AppError::Validation("Missing required fields".into()))?;

    let initiation = state.payment_service.initiate(&requester, booking_id).await?;
    Ok(Json(initiation))
}

/// Gateway success callback. The browser is always redirected; only a
/// verified, freshly claimed payment lands on the success page.
pub async fn payment_success(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaymentCallbackQuery>,
    notification: Result<Form<PaymentNotification>, FormRejection>,
) -> Redirect {
    let public_url = state.config.public_url.trim_end_matches('/');
    let failure = Redirect::to(&format!("{}/failure", public_url));

    let Ok(Form(notification)) = notification else {
        warn!("Payment callback rejected: malformed form body");
        return failure;
    };

    match state.payment_service.reconcile(query.booking_id, &notification).await {
        Ok(booking_id) => Redirect::to(&format!("{}/success?bookingId={}", public_url, booking_id)),
        Err(e) => {
            warn!("Payment callback rejected: {}", e);
            failure
        }
    }
}
