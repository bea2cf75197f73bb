mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{days_from_now, AuthHeaders, TestApp};
use serde_json::{json, Value};

async fn set_status(app: &TestApp, admin: &AuthHeaders, booking_id: i64, status: &str) -> (StatusCode, Value) {
    app.request("PUT", &format!("/api/v1/bookings/{}/status", booking_id), Some(admin), Some(json!({ "status": status }))).await
}

async fn cancel(app: &TestApp, auth: &AuthHeaders, booking_id: i64) -> (StatusCode, Value) {
    app.request("POST", &format!("/api/v1/bookings/{}/cancel", booking_id), Some(auth), None).await
}

#[tokio::test]
async fn test_owner_cancels_pending_booking_idempotently() {
    let app = TestApp::new().await;
    let vehicle_id = app.seed_vehicle("100").await;
    let user = app.user("user-a");

    let (_, booking) = app.create_booking(&user, vehicle_id, days_from_now(3), days_from_now(4)).await;
    let booking_id = booking["id"].as_i64().unwrap();

    let (status, body) = cancel(&app, &user, booking_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, body) = cancel(&app, &user, booking_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
}

#[tokio::test]
async fn test_only_owner_or_admin_can_cancel() {
    let app = TestApp::new().await;
    let vehicle_id = app.seed_vehicle("100").await;
    let owner = app.user("owner");
    let stranger = app.user("stranger");
    let admin = app.admin();

    let (_, booking) = app.create_booking(&owner, vehicle_id, days_from_now(3), days_from_now(4)).await;
    let booking_id = booking["id"].as_i64().unwrap();

    let (status, _) = cancel(&app, &stranger, booking_id).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.booking_status(booking_id).await, "pending");

    let (status, _) = cancel(&app, &admin, booking_id).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = cancel(&app, &admin, 99999).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_confirmed_booking_cancellable_only_before_start() {
    let app = TestApp::new().await;
    let vehicle_id = app.seed_vehicle("100").await;
    let user = app.user("user-a");
    let admin = app.admin();

    let (_, future) = app.create_booking(&user, vehicle_id, days_from_now(5), days_from_now(6)).await;
    let future_id = future["id"].as_i64().unwrap();
    set_status(&app, &admin, future_id, "confirmed").await;

    let (status, body) = cancel(&app, &user, future_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (_, started) = app.create_booking(&user, vehicle_id, days_from_now(0), days_from_now(2)).await;
    let started_id = started["id"].as_i64().unwrap();
    set_status(&app, &admin, started_id, "confirmed").await;

    let (status, _) = cancel(&app, &user, started_id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.booking_status(started_id).await, "confirmed");
}

#[tokio::test]
async fn test_completed_booking_cannot_be_cancelled() {
    let app = TestApp::new().await;
    let vehicle_id = app.seed_vehicle("100").await;
    let user = app.user("user-a");
    let admin = app.admin();

    let (_, booking) = app.create_booking(&user, vehicle_id, days_from_now(3), days_from_now(4)).await;
    let booking_id = booking["id"].as_i64().unwrap();
    set_status(&app, &admin, booking_id, "completed").await;

    let (status, _) = cancel(&app, &user, booking_id).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.booking_status(booking_id).await, "completed");
}

#[tokio::test]
async fn test_complete_follows_lifecycle() {
    let app = TestApp::new().await;
    let vehicle_id = app.seed_vehicle("100").await;
    let user = app.user("user-a");
    let admin = app.admin();

    let (_, booking) = app.create_booking(&user, vehicle_id, days_from_now(3), days_from_now(4)).await;
    let booking_id = booking["id"].as_i64().unwrap();
    let uri = format!("/api/v1/bookings/{}/complete", booking_id);

    let (status, _) = app.request("POST", &uri, Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // pending -> completed is not a lifecycle edge
    let (status, _) = app.request("POST", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    set_status(&app, &admin, booking_id, "confirmed").await;
    let (status, body) = app.request("POST", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
}

#[tokio::test]
async fn test_admin_status_override() {
    let app = TestApp::new().await;
    let vehicle_id = app.seed_vehicle("100").await;
    let user = app.user("user-a");
    let admin = app.admin();

    let (_, booking) = app.create_booking(&user, vehicle_id, days_from_now(3), days_from_now(4)).await;
    let booking_id = booking["id"].as_i64().unwrap();

    let (status, _) = set_status(&app, &user, booking_id, "confirmed").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = set_status(&app, &admin, booking_id, "archived").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = set_status(&app, &admin, booking_id, "completed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    // Free-form: terminal statuses can be reopened by an operator
    let (status, body) = set_status(&app, &admin, booking_id, "confirmed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");

    let (status, body) = set_status(&app, &admin, booking_id, "confirmed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");

    let (status, _) = set_status(&app, &admin, 99999, "confirmed").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reactivation_cannot_double_book() {
    let app = TestApp::new().await;
    let vehicle_id = app.seed_vehicle("100").await;
    let alice = app.user("alice");
    let bob = app.user("bob");
    let admin = app.admin();

    let (_, first) = app.create_booking(&alice, vehicle_id, days_from_now(3), days_from_now(5)).await;
    let first_id = first["id"].as_i64().unwrap();
    cancel(&app, &alice, first_id).await;

    let (status, second) = app.create_booking(&bob, vehicle_id, days_from_now(5), days_from_now(7)).await;
    assert_eq!(status, StatusCode::CREATED);
    let second_id = second["id"].as_i64().unwrap();

    let (status, body) = set_status(&app, &admin, first_id, "pending").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Vehicle is already booked for the selected dates");
    assert_eq!(app.booking_status(first_id).await, "cancelled");

    // Moving between two active statuses does not conflict with itself
    let (status, _) = set_status(&app, &admin, second_id, "confirmed").await;
    assert_eq!(status, StatusCode::OK);

    cancel(&app, &bob, second_id).await;
    let (status, body) = set_status(&app, &admin, first_id, "confirmed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "confirmed");
}

#[tokio::test]
async fn test_sweep_completes_finished_rentals() {
    let app = TestApp::with_config(|config| config.allow_past_bookings = true).await;
    let vehicle_id = app.seed_vehicle("100").await;
    let user = app.user("user-a");
    let admin = app.admin();

    let (_, past) = app.create_booking(&user, vehicle_id, days_from_now(-5), days_from_now(-2)).await;
    let past_id = past["id"].as_i64().unwrap();
    set_status(&app, &admin, past_id, "confirmed").await;

    let (_, ongoing) = app.create_booking(&user, vehicle_id, days_from_now(-1), days_from_now(1)).await;
    let ongoing_id = ongoing["id"].as_i64().unwrap();
    set_status(&app, &admin, ongoing_id, "confirmed").await;

    let (_, unpaid) = app.create_booking(&user, vehicle_id, days_from_now(-10), days_from_now(-8)).await;
    let unpaid_id = unpaid["id"].as_i64().unwrap();

    let report = app.state.booking_service.run_sweep(None).await.unwrap();
    assert_eq!(report.completed, 1);
    assert_eq!(report.expired, 0);

    assert_eq!(app.booking_status(past_id).await, "completed");
    assert_eq!(app.booking_status(ongoing_id).await, "confirmed");
    assert_eq!(app.booking_status(unpaid_id).await, "pending");
}

#[tokio::test]
async fn test_sweep_expires_stale_unpaid_bookings() {
    let app = TestApp::new().await;
    let vehicle_id = app.seed_vehicle("100").await;
    let user = app.user("user-a");

    let (_, booking) = app.create_booking(&user, vehicle_id, days_from_now(3), days_from_now(4)).await;
    let booking_id = booking["id"].as_i64().unwrap();

    let report = app.state.booking_service.run_sweep(Some(Duration::minutes(30))).await.unwrap();
    assert_eq!(report.expired, 0);
    assert_eq!(app.booking_status(booking_id).await, "pending");

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let report = app.state.booking_service.run_sweep(Some(Duration::zero())).await.unwrap();
    assert_eq!(report.expired, 1);
    assert_eq!(app.booking_status(booking_id).await, "cancelled");

    let (status, _) = app.create_booking(&user, vehicle_id, days_from_now(3), days_from_now(4)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_sweep_refuses_unusable_ttl() {
    let app = TestApp::new().await;
    let vehicle_id = app.seed_vehicle("100").await;
    let user = app.user("user-a");

    let (_, booking) = app.create_booking(&user, vehicle_id, days_from_now(3), days_from_now(4)).await;
    let booking_id = booking["id"].as_i64().unwrap();

    assert!(app.state.booking_service.run_sweep(Some(Duration::minutes(-15))).await.is_err());
    assert!(app.state.booking_service.run_sweep(Some(Duration::days(100_000_000))).await.is_err());
    assert_eq!(app.booking_status(booking_id).await, "pending");
}
