use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    features::{
        bookings::{
            implementations::{
                BookingDraft, authorize_transition, booking_view, booking_views,
                find_for_participant, require_guest, validate_booking,
            },
            models::{BookingRole, BookingStatus, NewBooking},
            schemas::{BookingFilters, BookingIn, BookingPatch, StatusIn},
        },
        payments::models::PaymentStatus,
        registry::ResourceKind,
        schemas::ListResponse,
    },
    services::tasks::Job,
    utilities::{app_state::AppState, errors::AppError, jwt::Claims},
};

pub async fn get_many_bookings_handler(
    claims: Claims,
    State(state): State<AppState>,
    Query(filters): Query<BookingFilters>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = match filters.role.unwrap_or(BookingRole::Guest) {
        BookingRole::Guest => state.bookings.list_for_guest(claims.sub, filters.status).await?,
        BookingRole::Host => state.bookings.list_for_host(claims.sub, filters.status).await?,
    };
    let total = bookings.len() as i64;
    let data = booking_views(&state, bookings).await?;

    Ok(Json(ListResponse { data, total }))
}

pub async fn create_booking_handler(
    claims: Claims,
    State(state): State<AppState>,
    Json(schema): Json<BookingIn>,
) -> Result<impl IntoResponse, AppError> {
    schema.validate()?;

    let listing = state
        .listings
        .find(schema.listing_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Listing not found".to_string()))?;
    let quote = validate_booking(
        &BookingDraft::from(&schema),
        &listing,
        Utc::now().date_naive(),
        &state.config.booking_policy,
    )?;

    let booking = state
        .bookings
        .create(NewBooking {
            listing_id: listing.id,
            guest_id: claims.sub,
            check_in_date: schema.check_in_date,
            check_out_date: schema.check_out_date,
            number_of_guests: schema.number_of_guests,
            total_price: quote.total_price,
            special_requests: schema.special_requests,
        })
        .await?;
    info!(booking_id = %booking.id, listing_id = %listing.id, nights = quote.duration_days, "booking created");

    Ok((StatusCode::CREATED, Json(booking_view(&state, booking).await?)))
}

pub async fn get_one_booking_handler(
    claims: Claims,
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = find_for_participant(&state, booking_id, claims.sub).await?;

    Ok(Json(booking_view(&state, view.booking).await?))
}

pub async fn update_booking_handler(
    claims: Claims,
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(schema): Json<BookingPatch>,
) -> Result<impl IntoResponse, AppError> {
    let view = find_for_participant(&state, booking_id, claims.sub).await?;
    require_guest(&view.booking, claims.sub, "change")?;
    if view.booking.status != BookingStatus::Pending {
        return Err(AppError::ValidationError(format!(
            "A {} booking can no longer be changed",
            view.booking.status
        )));
    }
    let paid = state
        .payments
        .find_by_booking(booking_id)
        .await?
        .is_some_and(|payment| payment.status == PaymentStatus::Completed);
    if paid {
        return Err(AppError::ValidationError(
            "A paid booking can no longer be changed".to_string(),
        ));
    }

    let changes = schema.apply(
        &view.booking,
        &view.listing,
        Utc::now().date_naive(),
        &state.config.booking_policy,
    )?;
    let booking = state.bookings.update_details(booking_id, changes).await?;

    Ok(Json(booking_view(&state, booking).await?))
}

pub async fn change_booking_status_handler(
    claims: Claims,
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(schema): Json<StatusIn>,
) -> Result<impl IntoResponse, AppError> {
    let view = find_for_participant(&state, booking_id, claims.sub).await?;
    authorize_transition(&view.booking, view.role, schema.status)?;

    let booking = state
        .bookings
        .set_status(booking_id, view.booking.status, schema.status)
        .await?;
    info!(%booking_id, from = %view.booking.status, to = %booking.status, "booking status changed");

    if booking.status == BookingStatus::Confirmed {
        state.tasks.enqueue(Job::BookingConfirmed { booking_id });
    }

    Ok(Json(booking_view(&state, booking).await?))
}

pub async fn delete_booking_handler(
    claims: Claims,
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = find_for_participant(&state, booking_id, claims.sub).await?;
    require_guest(&view.booking, claims.sub, "delete")?;

    let order = state.registry.cascade_order(ResourceKind::Booking);
    state
        .purger
        .purge(ResourceKind::Booking, booking_id, &order)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
