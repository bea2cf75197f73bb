pub mod auth;
pub mod booking;
pub mod money;
pub mod payment;
pub mod vehicle;
