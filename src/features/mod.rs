pub mod bookings;
pub mod cascade;
pub mod listings;
pub mod payments;
pub mod registry;
pub mod reviews;
pub mod schemas;
pub mod users;

use axum::{Router, routing::get};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::utilities::app_state::AppState;

/// Every registered resource plus the registry description itself.
pub fn router(state: AppState) -> Router {
    state
        .registry
        .router()
        .route(
            "/api/v1/resources",
            get(registry::describe_resources_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
