use std::sync::Arc;
use crate::domain::ports::VehicleRepository;
use crate::domain::services::{booking_service::BookingService, payment_service::PaymentService};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub vehicle_repo: Arc<dyn VehicleRepository>,
    pub booking_service: Arc<BookingService>,
    pub payment_service: Arc<PaymentService>,
}
