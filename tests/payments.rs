mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;
use travel_listings::{
    features::payments::models::{NewPayment, PaymentStatus},
    utilities::errors::AppError,
};

use common::{TestApp, hotel};

async fn booked(app: &TestApp) -> (String, String, String) {
    let host = app.register("host").await;
    let guest = app.register("guest").await;
    let listing = app
        .create_listing(&host, hotel("Harbour Hotel", "80.00", "Lisbon"))
        .await;
    let today = Utc::now().date_naive();
    let (status, booking) = app
        .post(
            "/api/v1/bookings",
            &guest,
            json!({
                "listing_id": listing,
                "check_in_date": today + Duration::days(3),
                "check_out_date": today + Duration::days(6),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{booking}");

    (host, guest, booking["id"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn guests_pay_for_their_booking() {
    let mut app = TestApp::new();
    let (host, guest, booking) = booked(&app).await;
    let initiate = format!("/api/v1/payments/initiate/{booking}");
    let verify = format!("/api/v1/payments/verify/{booking}");

    let (status, _) = app.post(&initiate, &host, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, payment) = app.post(&initiate, &guest, json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["amount"], "240.00");
    assert_eq!(payment["status"], "pending");
    let transaction_id = payment["transaction_id"].as_str().unwrap().to_string();
    assert!(transaction_id.starts_with("txn-"));

    let (status, again) = app.post(&initiate, &guest, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["transaction_id"], transaction_id.as_str());

    app.drain_jobs().await;
    let (status, verified) = app.post(&verify, &guest, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["status"], "completed");

    assert_eq!(app.drain_jobs().await, 1);
    let receipt = app.mailer.sent().pop().unwrap();
    assert_eq!(receipt.subject, "Payment Receipt");
    assert_eq!(receipt.to, vec!["guest@travel.test"]);

    let (status, body) = app.post(&initiate, &guest, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["booking"].is_array());
}

#[tokio::test]
async fn verifying_without_a_payment_is_not_found() {
    let app = TestApp::new();
    let (_, guest, booking) = booked(&app).await;

    let (status, _) = app
        .post(&format!("/api/v1/payments/verify/{booking}"), &guest, json!({}))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancelled_bookings_cannot_be_paid() {
    let app = TestApp::new();
    let (_, guest, booking) = booked(&app).await;
    app.post(
        &format!("/api/v1/bookings/{booking}/status"),
        &guest,
        json!({"status": "cancelled"}),
    )
    .await;

    let (status, body) = app
        .post(&format!("/api/v1/payments/initiate/{booking}"), &guest, json!({}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["booking"].is_array());
}

#[tokio::test]
async fn transaction_ids_are_unique() {
    let app = TestApp::new();
    let (_, guest, first) = booked(&app).await;
    let listing = app.state.bookings.find(first.parse().unwrap()).await.unwrap().unwrap().listing_id;
    let today = Utc::now().date_naive();
    let (_, second) = app
        .post(
            "/api/v1/bookings",
            &guest,
            json!({
                "listing_id": listing,
                "check_in_date": today + Duration::days(20),
                "check_out_date": today + Duration::days(21),
            }),
        )
        .await;

    let payment = |booking_id: &str| NewPayment {
        booking_id: booking_id.parse().unwrap(),
        amount: "10.00".parse().unwrap(),
        transaction_id: "txn-fixed".to_string(),
        checkout_url: None,
    };

    let created = app.state.payments.create(payment(&first)).await.unwrap();
    assert_eq!(created.status, PaymentStatus::Pending);

    let duplicate = app
        .state
        .payments
        .create(payment(second["id"].as_str().unwrap()))
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn rescheduling_reprices_the_pending_payment() {
    let app = TestApp::new();
    let (_, guest, booking) = booked(&app).await;
    let initiate = format!("/api/v1/payments/initiate/{booking}");
    let verify = format!("/api/v1/payments/verify/{booking}");

    let (_, first) = app.post(&initiate, &guest, json!({})).await;
    assert_eq!(first["amount"], "240.00");

    let check_out = Utc::now().date_naive() + Duration::days(13);
    let (status, rescheduled) = app
        .patch(
            &format!("/api/v1/bookings/{booking}"),
            &guest,
            json!({"check_out_date": check_out}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{rescheduled}");
    assert_eq!(rescheduled["total_price"], "800.00");

    let (status, body) = app.post(&verify, &guest, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["booking"].is_array());

    let (status, reissued) = app.post(&initiate, &guest, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reissued["amount"], "800.00");
    assert_eq!(reissued["status"], "pending");
    assert_ne!(reissued["transaction_id"], first["transaction_id"]);

    let (status, verified) = app.post(&verify, &guest, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["amount"], "800.00");
    assert_eq!(verified["status"], "completed");
}

#[tokio::test]
async fn paid_bookings_cannot_be_rescheduled() {
    let app = TestApp::new();
    let (_, guest, booking) = booked(&app).await;
    app.post(&format!("/api/v1/payments/initiate/{booking}"), &guest, json!({}))
        .await;
    app.post(&format!("/api/v1/payments/verify/{booking}"), &guest, json!({}))
        .await;

    let (status, _) = app
        .patch(
            &format!("/api/v1/bookings/{booking}"),
            &guest,
            json!({"number_of_guests": 2}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn payments_of_cancelled_bookings_are_not_verified() {
    let mut app = TestApp::new();
    let (_, guest, booking) = booked(&app).await;
    let (status, _) = app
        .post(&format!("/api/v1/payments/initiate/{booking}"), &guest, json!({}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .post(
            &format!("/api/v1/bookings/{booking}/status"),
            &guest,
            json!({"status": "cancelled"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    app.drain_jobs().await;

    let (status, body) = app
        .post(&format!("/api/v1/payments/verify/{booking}"), &guest, json!({}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["booking"].is_array());
    let payment = app
        .state
        .payments
        .find_by_booking(booking.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(app.drain_jobs().await, 0);
}
