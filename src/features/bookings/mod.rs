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
            "/api/v1/bookings",
            get(handlers::get_many_bookings_handler).post(handlers::create_booking_handler),
        )
        .route(
            "/api/v1/bookings/{id}",
            get(handlers::get_one_booking_handler)
                .patch(handlers::update_booking_handler)
                .delete(handlers::delete_booking_handler),
        )
        .route(
            "/api/v1/bookings/{id}/status",
            post(handlers::change_booking_status_handler),
        )
}

pub fn resource() -> ResourceEntry {
    ResourceEntry {
        kind: ResourceKind::Booking,
        path: "/api/v1/bookings",
        filter_fields: &["role", "status"],
        search_fields: &[],
        ordering_fields: &["created_at"],
        cascades: &[ResourceKind::Payment],
        routes,
    }
}
