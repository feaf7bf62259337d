pub mod gateway;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod tasks;

use axum::{Router, routing::post};

use crate::{
    features::registry::{ResourceEntry, ResourceKind},
    utilities::app_state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/payments/initiate/{booking_id}",
            post(handlers::initiate_payment_handler),
        )
        .route(
            "/api/v1/payments/verify/{booking_id}",
            post(handlers::verify_payment_handler),
        )
}

pub fn resource() -> ResourceEntry {
    ResourceEntry {
        kind: ResourceKind::Payment,
        path: "/api/v1/payments",
        filter_fields: &[],
        search_fields: &[],
        ordering_fields: &[],
        cascades: &[],
        routes,
    }
}
