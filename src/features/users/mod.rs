pub mod handlers;
pub mod implementations;
pub mod models;
pub mod repository;
pub mod schemas;

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    features::registry::{ResourceEntry, ResourceKind},
    utilities::app_state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/register", post(handlers::register_handler))
        .route("/api/v1/auth/login", post(handlers::login_handler))
        .route("/api/v1/profile", get(handlers::get_profile_handler))
}

pub fn resource() -> ResourceEntry {
    ResourceEntry {
        kind: ResourceKind::User,
        path: "/api/v1/auth",
        filter_fields: &[],
        search_fields: &[],
        ordering_fields: &[],
        cascades: &[],
        routes,
    }
}
