pub mod aggregation;
pub mod handlers;
pub mod implementations;
pub mod models;
pub mod repository;
pub mod schemas;
pub mod tasks;

use axum::{Router, routing::get};

use crate::{
    features::registry::{ResourceEntry, ResourceKind},
    utilities::app_state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/reviews",
            get(handlers::get_many_reviews_handler).post(handlers::create_review_handler),
        )
        .route(
            "/api/v1/reviews/{id}",
            get(handlers::get_one_review_handler)
                .patch(handlers::update_review_handler)
                .delete(handlers::delete_review_handler),
        )
}

pub fn resource() -> ResourceEntry {
    ResourceEntry {
        kind: ResourceKind::Review,
        path: "/api/v1/reviews",
        filter_fields: &["listing", "rating"],
        search_fields: &[],
        ordering_fields: &["created_at"],
        cascades: &[],
        routes,
    }
}
