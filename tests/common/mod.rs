#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use travel_listings::{
    features,
    services::{
        mailer::{Email, Mailer},
        memory::MemoryStore,
        tasks::{JobReceiver, TaskQueue, run_job},
    },
    utilities::{app_state::AppState, config::Config, errors::AppError},
};

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
    receiver: JobReceiver,
}

pub fn test_config() -> Config {
    Config {
        bcrypt_cost: 4,
        secret_key: "integration-test-secret".to_string(),
        admin_emails: vec!["ops@travel.test".to_string()],
        ..Config::default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let (tasks, receiver) = TaskQueue::channel();
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::from_store(config, Arc::new(MemoryStore::new()), mailer.clone(), tasks);
        let router = features::router(state.clone());

        Self {
            state,
            router,
            mailer,
            receiver,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers `username` and returns its access token.
    pub async fn register(&self, username: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{username}@travel.test"),
                    "password": "password123",
                    "first_name": username,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn create_listing(&self, token: &str, body: Value) -> String {
        let (status, listing) = self.post("/api/v1/listings", token, body).await;
        assert_eq!(status, StatusCode::CREATED, "{listing}");
        listing["id"].as_str().unwrap().to_string()
    }

    /// Runs every queued job on the current task.
    pub async fn drain_jobs(&mut self) -> usize {
        let mut count = 0;
        while let Ok(job) = self.receiver.try_recv() {
            run_job(&self.state, job).await;
            count += 1;
        }
        count
    }
}

pub fn hotel(title: &str, price: &str, location: &str) -> Value {
    json!({
        "title": title,
        "description": format!("{title} with a view"),
        "listing_type": "hotel",
        "price": price,
        "location": location,
    })
}
