use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    features::{
        listings::{
            implementations::{find_active, find_owned, listing_views},
            models::Listing,
            schemas::{ListingFilters, ListingIn, ListingOut, ListingPatch, ListingQuery},
        },
        reviews::{
            implementations::{add_review, review_view, review_views},
            schemas::ReviewIn,
        },
        schemas::{ListResponse, MessageResponse, Pagination},
    },
    services::tasks::Job,
    utilities::{
        app_state::{AppState, Listings, Reviews, Users},
        errors::AppError,
        jwt::Claims,
    },
};

async fn single_view(users: &Users, reviews: &Reviews, listing: Listing) -> Result<ListingOut, AppError> {
    listing_views(users.as_ref(), reviews.as_ref(), vec![listing])
        .await?
        .pop()
        .ok_or_else(|| AppError::InternalError("listing view missing".to_string()))
}

pub async fn get_many_listings_handler(
    State(listings): State<Listings>,
    State(reviews): State<Reviews>,
    State(users): State<Users>,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<ListingFilters>,
) -> Result<impl IntoResponse, AppError> {
    pagination.validate()?;
    let query = ListingQuery::try_from(filters)?;
    debug!(?query, "listing search");

    let (page, total) = listings.list(&query, pagination).await?;
    let data = listing_views(users.as_ref(), reviews.as_ref(), page).await?;

    Ok(Json(ListResponse { data, total }))
}

pub async fn create_listing_handler(
    claims: Claims,
    State(state): State<AppState>,
    Json(schema): Json<ListingIn>,
) -> Result<impl IntoResponse, AppError> {
    let new_listing = schema.into_new_listing(claims.sub)?;
    let listing = state.listings.create(new_listing).await?;
    info!(listing_id = %listing.id, owner_id = %claims.sub, "listing created");

    state.tasks.enqueue(Job::ListingCreated {
        listing_id: listing.id,
    });

    let view = single_view(&state.users, &state.reviews, listing).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_one_listing_handler(
    State(listings): State<Listings>,
    State(reviews): State<Reviews>,
    State(users): State<Users>,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let listing = find_active(listings.as_ref(), listing_id).await?;
    let listing_reviews = reviews.for_listing(listing.id).await?;
    let listing_reviews = review_views(users.as_ref(), listing_reviews).await?;

    let view = single_view(&users, &reviews, listing).await?;
    Ok(Json(view.with_reviews(listing_reviews)))
}

pub async fn update_listing_handler(
    claims: Claims,
    State(listings): State<Listings>,
    State(reviews): State<Reviews>,
    State(users): State<Users>,
    Path(listing_id): Path<Uuid>,
    Json(schema): Json<ListingPatch>,
) -> Result<impl IntoResponse, AppError> {
    let listing = find_owned(listings.as_ref(), listing_id, claims.sub).await?;
    let changes = schema.apply(&listing)?;
    let listing = listings.update(listing.id, changes).await?;

    Ok(Json(single_view(&users, &reviews, listing).await?))
}

/// Soft delete: the listing is hidden, its reviews and bookings stay.
pub async fn deactivate_listing_handler(
    claims: Claims,
    State(listings): State<Listings>,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let listing = find_owned(listings.as_ref(), listing_id, claims.sub).await?;
    let mut changes = listing.changes();
    changes.is_active = false;
    listings.update(listing.id, changes).await?;
    info!(%listing_id, "listing deactivated");

    Ok(Json(MessageResponse {
        message: "Your listing was deactivated successfully!".to_string(),
    }))
}

pub async fn add_listing_review_handler(
    claims: Claims,
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
    Json(schema): Json<ReviewIn>,
) -> Result<impl IntoResponse, AppError> {
    let review = add_review(&state, listing_id, claims.sub, schema).await?;
    let view = review_view(state.users.as_ref(), review).await?;

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_listing_reviews_handler(
    State(listings): State<Listings>,
    State(reviews): State<Reviews>,
    State(users): State<Users>,
    Path(listing_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let listing = find_active(listings.as_ref(), listing_id).await?;
    let listing_reviews = reviews.for_listing(listing.id).await?;

    Ok(Json(review_views(users.as_ref(), listing_reviews).await?))
}
