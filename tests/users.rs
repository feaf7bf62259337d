mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn registered_users_can_log_in_and_read_their_profile() {
    let app = TestApp::new();
    app.register("maria").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "MARIA@travel.test", "password": "password123"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["access_token"].as_str().unwrap();

    let (status, profile) = app.get("/api/v1/profile", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["username"], "maria");
    assert!(profile.get("password").is_none());
}

#[tokio::test]
async fn wrong_passwords_are_rejected() {
    let app = TestApp::new();
    app.register("maria").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "maria@travel.test", "password": "not-the-one"})),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "not_authenticated");
}

#[tokio::test]
async fn usernames_and_emails_are_unique() {
    let app = TestApp::new();
    app.register("maria").await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "username": "maria",
                "email": "other@travel.test",
                "password": "password123",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflict");
    assert!(body["fields"]["non_field_errors"].is_array());
}

#[tokio::test]
async fn garbage_tokens_are_unauthorized() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/v1/profile", Some("not.a.token")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
