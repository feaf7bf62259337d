pub mod handlers;
pub mod implementations;
pub mod models;
pub mod repository;
pub mod schemas;
pub mod tasks;

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
        .route(
            "/api/v1/listings",
            get(handlers::get_many_listings_handler).post(handlers::create_listing_handler),
        )
        .route(
            "/api/v1/listings/{id}",
            get(handlers::get_one_listing_handler)
                .patch(handlers::update_listing_handler)
                .delete(handlers::deactivate_listing_handler),
        )
        .route(
            "/api/v1/listings/{id}/reviews",
            post(handlers::add_listing_review_handler).get(handlers::get_listing_reviews_handler),
        )
}

pub fn resource() -> ResourceEntry {
    ResourceEntry {
        kind: ResourceKind::Listing,
        path: "/api/v1/listings",
        filter_fields: &["listing_type", "location"],
        search_fields: &["title", "description", "location"],
        ordering_fields: schemas::ListingOrdering::FIELDS,
        cascades: &[ResourceKind::Review, ResourceKind::Booking],
        routes,
    }
}
