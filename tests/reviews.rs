mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestApp, hotel};

#[tokio::test]
async fn reviews_feed_the_listing_rating() {
    let app = TestApp::new();
    let owner = app.register("owner").await;
    let listing = app
        .create_listing(&owner, hotel("Harbour Hotel", "120.00", "Lisbon"))
        .await;

    for (name, rating) in [("ana", 5), ("ben", 3), ("cai", 4)] {
        let token = app.register(name).await;
        let (status, body) = app
            .post(
                "/api/v1/reviews",
                &token,
                json!({"listing": listing, "rating": rating, "comment": "Lovely"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["reviewer"]["username"], name);
    }

    let (_, detail) = app.get(&format!("/api/v1/listings/{listing}"), None).await;
    assert_eq!(detail["average_rating"], 4.0);
    assert_eq!(detail["review_count"], 3);
    assert_eq!(detail["reviews"].as_array().unwrap().len(), 3);

    let (_, filtered) = app
        .get(&format!("/api/v1/reviews?listing={listing}&rating=5"), None)
        .await;
    assert_eq!(filtered["total"], 1);
}

#[tokio::test]
async fn a_user_reviews_a_listing_once() {
    let app = TestApp::new();
    let owner = app.register("owner").await;
    let guest = app.register("guest").await;
    let listing = app
        .create_listing(&owner, hotel("Harbour Hotel", "120.00", "Lisbon"))
        .await;
    let uri = format!("/api/v1/listings/{listing}/reviews");

    let (status, _) = app.post(&uri, &guest, json!({"rating": 4})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post(&uri, &guest, json!({"rating": 2})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "duplicate_review");
}

#[tokio::test]
async fn owners_cannot_review_their_own_listing() {
    let app = TestApp::new();
    let owner = app.register("owner").await;
    let listing = app
        .create_listing(&owner, hotel("Harbour Hotel", "120.00", "Lisbon"))
        .await;

    let (status, body) = app
        .post(
            &format!("/api/v1/listings/{listing}/reviews"),
            &owner,
            json!({"rating": 5}),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "permission_denied");
}

#[tokio::test]
async fn review_input_is_validated() {
    let app = TestApp::new();
    let owner = app.register("owner").await;
    let guest = app.register("guest").await;
    let listing = app
        .create_listing(&owner, hotel("Harbour Hotel", "120.00", "Lisbon"))
        .await;

    let (status, body) = app
        .post("/api/v1/reviews", &guest, json!({"listing": listing, "rating": 6}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["rating"].is_array());

    let (status, body) = app.post("/api/v1/reviews", &guest, json!({"rating": 3})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["listing"].is_array());

    let missing = uuid::Uuid::new_v4();
    let (status, _) = app
        .post("/api/v1/reviews", &guest, json!({"listing": missing, "rating": 3}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_author_edits_or_deletes_a_review() {
    let app = TestApp::new();
    let owner = app.register("owner").await;
    let author = app.register("author").await;
    let other = app.register("other").await;
    let listing = app
        .create_listing(&owner, hotel("Harbour Hotel", "120.00", "Lisbon"))
        .await;
    let (_, review) = app
        .post(
            &format!("/api/v1/listings/{listing}/reviews"),
            &author,
            json!({"rating": 2, "comment": "Noisy"}),
        )
        .await;
    let uri = format!("/api/v1/reviews/{}", review["id"].as_str().unwrap());

    let (status, _) = app.patch(&uri, &other, json!({"rating": 1})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&uri, &other).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.patch(&uri, &author, json!({"rating": 4})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 4);
    assert_eq!(body["comment"], "Noisy");

    let (status, _) = app.delete(&uri, &author).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn new_reviews_email_the_listing_owner() {
    let mut app = TestApp::new();
    let owner = app.register("owner").await;
    let guest = app.register("guest").await;
    let listing = app
        .create_listing(&owner, hotel("Harbour Hotel", "120.00", "Lisbon"))
        .await;
    app.drain_jobs().await;

    app.post(
        &format!("/api/v1/listings/{listing}/reviews"),
        &guest,
        json!({"rating": 5, "comment": "Perfect"}),
    )
    .await;
    app.drain_jobs().await;

    let sent = app.mailer.sent();
    let review_mail = sent.last().unwrap();
    assert_eq!(review_mail.subject, "New Review for Harbour Hotel");
    assert_eq!(review_mail.to, vec!["owner@travel.test"]);
}
