mod common;

use axum::http::StatusCode;
use serde_json::Value;

use common::TestApp;

fn resource<'a>(body: &'a Value, name: &str) -> &'a Value {
    body.as_array()
        .unwrap()
        .iter()
        .find(|resource| resource["name"] == name)
        .unwrap()
}

#[tokio::test]
async fn every_resource_is_described() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/v1/resources", None).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|resource| resource["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["user", "listing", "review", "booking", "payment"]);

    let listing = resource(&body, "listing");
    assert_eq!(listing["path"], "/api/v1/listings");
    assert_eq!(
        listing["ordering_fields"],
        serde_json::json!(["created_at", "price", "title"])
    );
    assert_eq!(
        listing["deletes_with_it"],
        serde_json::json!(["review", "payment", "booking"])
    );

    let booking = resource(&body, "booking");
    assert_eq!(booking["deletes_with_it"], serde_json::json!(["payment"]));

    let review = resource(&body, "review");
    assert_eq!(review["deletes_with_it"], serde_json::json!([]));
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/v1/wishlists", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
