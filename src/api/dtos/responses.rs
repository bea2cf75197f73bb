use serde::Serialize;

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
