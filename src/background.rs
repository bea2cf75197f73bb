use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, debug, info_span, Instrument};
use crate::state::AppState;

/// Periodic lifecycle sweep: finishes rentals whose end date has passed and,
/// when a TTL is configured, releases pending bookings that were never paid.
pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting background booking sweeper...");

    let interval = Duration::from_secs(state.config.sweep_interval_secs.max(1));
    let pending_ttl = state.config.pending_ttl_minutes.and_then(chrono::Duration::try_minutes);

    loop {
        let span = info_span!("booking_sweep", ttl_minutes = ?state.config.pending_ttl_minutes);

        async {
            match state.booking_service.run_sweep(pending_ttl).await {
                Ok(report) if report.completed > 0 || report.expired > 0 => {
                    info!(completed = report.completed, expired = report.expired, "Sweep updated bookings");
                }
                Ok(_) => debug!("Sweep found nothing to update"),
                Err(e) => error!("Booking sweep failed: {:?}", e),
            }
        }
            .instrument(span)
            .await;

        sleep(interval).await;
    }
}
