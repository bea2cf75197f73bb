use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use crate::domain::{
    models::{
        auth::Requester,
        booking::BookingStatus,
        money::Money,
        payment::{signature_payload, GatewayFormParams, PaymentInitiation, PaymentNotification, SIGNED_FIELD_NAMES},
    },
    ports::{BookingRepository, SignatureVerifier},
};
use crate::error::AppError;

const ZERO_CHARGE: &str = "0.00";

pub struct PaymentSettings {
    pub product_code: String,
    pub payment_url: String,
    pub public_url: String,
}

pub struct PaymentService {
    bookings: Arc<dyn BookingRepository>,
    verifier: Arc<dyn SignatureVerifier>,
    settings: PaymentSettings,
}

impl PaymentService {
    pub fn new(bookings: Arc<dyn BookingRepository>, verifier: Arc<dyn SignatureVerifier>, settings: PaymentSettings) -> Self {
        Self { bookings, verifier, settings }
    }

    /// Builds the signed checkout form for one pending, unclaimed booking. The
    /// booking id travels in the success URL so the callback can correlate it.
    pub async fn initiate(&self, requester: &Requester, booking_id: i64) -> Result<PaymentInitiation, AppError> {
        let booking = self.bookings.find_by_id(booking_id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))?;

        if !requester.may_act_for(&booking.user_id) {
            return Err(AppError::Forbidden("Not allowed to pay for this booking".into()));
        }
        if booking.status != BookingStatus::Pending || booking.transaction_uuid.is_some() {
            return Err(AppError::InvalidState("Booking is not awaiting payment".into()));
        }
        if booking.total_cost < Money::from(1) {
            return Err(AppError::Validation("Invalid amount".into()));
        }

        let transaction_uuid = Uuid::new_v4().to_string();
        let total_amount = booking.total_cost.to_gateway_string();
        let payload = signature_payload(&total_amount, &transaction_uuid, &self.settings.product_code);
        let signature = self.verifier.sign(&payload);
        let public_url = self.settings.public_url.trim_end_matches('/');

        info!(booking_id, transaction_uuid = %transaction_uuid, "Payment initiated for {}", total_amount);

        Ok(PaymentInitiation {
            booking_id,
            payment_url: self.settings.payment_url.clone(),
            params: GatewayFormParams {
                amount: total_amount.clone(),
                tax_amount: ZERO_CHARGE.to_string(),
                total_amount,
                product_service_charge: ZERO_CHARGE.to_string(),
                product_delivery_charge: ZERO_CHARGE.to_string(),
                transaction_uuid,
                product_code: self.settings.product_code.clone(),
                signature,
                success_url: format!("{}/api/v1/payments/success?booking_id={}", public_url, booking_id),
                failure_url: format!("{}/failure", public_url),
                signed_field_names: SIGNED_FIELD_NAMES.to_string(),
            },
        })
    }

    /// Verifies the gateway signature, then claims the booking in a single
    /// conditional update. A replayed notification finds nothing left to claim.
    pub async fn reconcile(&self, booking_id: Option<i64>, notification: &PaymentNotification) -> Result<i64, AppError> {
        if let Some(product_code) = &notification.product_code
            && product_code != &self.settings.product_code
        {
            warn!(transaction_uuid = %notification.transaction_uuid, "Payment rejected: foreign product code '{}'", product_code);
            return Err(AppError::InvalidSignature);
        }

        let payload = signature_payload(
            &notification.total_amount,
            &notification.transaction_uuid,
            &self.settings.product_code,
        );
        if !self.verifier.verify(&payload, &notification.signature) {
            warn!(transaction_uuid = %notification.transaction_uuid, "Payment rejected: signature mismatch");
            return Err(AppError::InvalidSignature);
        }

        let Some(booking_id) = booking_id else {
            warn!(transaction_uuid = %notification.transaction_uuid, "Payment rejected: no booking id in callback");
            return Err(AppError::NoMatchingBooking);
        };

        let booking = self.bookings.find_by_id(booking_id).await?
            .ok_or(AppError::NoMatchingBooking)?;

        let paid = Money::from_str(&notification.total_amount).map_err(|_| {
            warn!(booking_id, "Payment rejected: unparseable amount '{}'", notification.total_amount);
            AppError::NoMatchingBooking
        })?;
        if paid != booking.total_cost {
            warn!(booking_id, paid = %paid, expected = %booking.total_cost, "Payment rejected: amount mismatch");
            return Err(AppError::NoMatchingBooking);
        }

        match self.bookings.claim_payment(booking_id, &notification.transaction_uuid).await? {
            Some(claimed) => {
                info!(booking_id = claimed.id, transaction_uuid = %notification.transaction_uuid, "Payment reconciled, booking confirmed");
                Ok(claimed.id)
            }
            None => {
                warn!(booking_id, transaction_uuid = %notification.transaction_uuid, "Payment rejected: booking already claimed or no longer pending");
                Err(AppError::NoMatchingBooking)
            }
        }
    }
}
