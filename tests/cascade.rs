mod common;

use std::time::Duration as StdDuration;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;
use travel_listings::{
    features::{listings::tasks::cleanup_inactive_listings, registry::ResourceKind},
    services::tasks::Job,
    utilities::config::Config,
};
use uuid::Uuid;

use common::{TestApp, hotel, test_config};

struct Seeded {
    owner: String,
    listing: Uuid,
    booking: Uuid,
}

async fn listing_with_history(app: &TestApp) -> Seeded {
    let owner = app.register("owner").await;
    let guest = app.register("guest").await;
    let listing = app
        .create_listing(&owner, hotel("Harbour Hotel", "100.00", "Lisbon"))
        .await;

    app.post(
        &format!("/api/v1/listings/{listing}/reviews"),
        &guest,
        json!({"rating": 4}),
    )
    .await;

    let today = Utc::now().date_naive();
    let (_, booking) = app
        .post(
            "/api/v1/bookings",
            &guest,
            json!({
                "listing_id": listing,
                "check_in_date": today + Duration::days(5),
                "check_out_date": today + Duration::days(7),
            }),
        )
        .await;
    let booking = booking["id"].as_str().unwrap().to_string();
    let (status, _) = app
        .post(&format!("/api/v1/payments/initiate/{booking}"), &guest, json!({}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    Seeded {
        owner,
        listing: listing.parse().unwrap(),
        booking: booking.parse().unwrap(),
    }
}

fn sweep_config(purge: bool) -> Config {
    Config {
        cleanup_inactive_after_days: 0,
        cleanup_purge: purge,
        ..test_config()
    }
}

#[tokio::test]
async fn purging_a_listing_removes_everything_attached() {
    let app = TestApp::new();
    let seeded = listing_with_history(&app).await;
    let state = &app.state;

    let order = state.registry.cascade_order(ResourceKind::Listing);
    let report = state
        .purger
        .purge(ResourceKind::Listing, seeded.listing, &order)
        .await
        .unwrap();

    assert_eq!(report.removed(ResourceKind::Listing), 1);
    assert_eq!(report.removed(ResourceKind::Review), 1);
    assert_eq!(report.removed(ResourceKind::Booking), 1);
    assert_eq!(report.removed(ResourceKind::Payment), 1);
    assert!(state.listings.find(seeded.listing).await.unwrap().is_none());
    assert!(state.bookings.find(seeded.booking).await.unwrap().is_none());
    assert!(state.reviews.for_listing(seeded.listing).await.unwrap().is_empty());
    assert!(
        state
            .payments
            .find_by_booking(seeded.booking)
            .await
            .unwrap()
            .is_none()
    );

    let missing = state
        .purger
        .purge(ResourceKind::Listing, seeded.listing, &order)
        .await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn cleanup_only_reports_without_purge() {
    let app = TestApp::with_config(sweep_config(false));
    let seeded = listing_with_history(&app).await;
    app.delete(&format!("/api/v1/listings/{}", seeded.listing), &seeded.owner)
        .await;
    tokio::time::sleep(StdDuration::from_millis(5)).await;

    let report = cleanup_inactive_listings(&app.state, false).await.unwrap();

    assert_eq!(report.stale, 1);
    assert_eq!(report.purged, 0);
    assert!(app.state.listings.find(seeded.listing).await.unwrap().is_some());
}

#[tokio::test]
async fn scheduled_cleanup_purges_inactive_listings() {
    let mut app = TestApp::with_config(sweep_config(true));
    let seeded = listing_with_history(&app).await;
    let active = app
        .create_listing(&seeded.owner, hotel("Alpine Lodge", "180.00", "Zermatt"))
        .await;
    app.delete(&format!("/api/v1/listings/{}", seeded.listing), &seeded.owner)
        .await;
    tokio::time::sleep(StdDuration::from_millis(5)).await;
    app.drain_jobs().await;

    app.state.tasks.enqueue(Job::CleanupInactiveListings);
    assert_eq!(app.drain_jobs().await, 1);

    assert!(app.state.listings.find(seeded.listing).await.unwrap().is_none());
    assert!(app.state.bookings.find(seeded.booking).await.unwrap().is_none());
    assert!(
        app.state
            .listings
            .find(active.parse().unwrap())
            .await
            .unwrap()
            .is_some()
    );
}
