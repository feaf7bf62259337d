use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    features::{
        registry::ResourceKind,
        reviews::{
            implementations::{add_review, find_own_review, review_view, review_views},
            schemas::{ReviewFilters, ReviewIn, ReviewPatch},
        },
        schemas::{ListResponse, Pagination},
    },
    utilities::{
        app_state::{AppState, Purger, Registry, Reviews, Users},
        errors::AppError,
        jwt::Claims,
    },
};

pub async fn get_many_reviews_handler(
    State(reviews): State<Reviews>,
    State(users): State<Users>,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<ReviewFilters>,
) -> Result<impl IntoResponse, AppError> {
    pagination.validate()?;

    let (page, total) = reviews.list(&filters, pagination).await?;
    let data = review_views(users.as_ref(), page).await?;

    Ok(Json(ListResponse { data, total }))
}

pub async fn create_review_handler(
    claims: Claims,
    State(state): State<AppState>,
    Json(schema): Json<ReviewIn>,
) -> Result<impl IntoResponse, AppError> {
    let listing_id = schema.listing_id()?;
    let review = add_review(&state, listing_id, claims.sub, schema).await?;
    info!(review_id = %review.id, %listing_id, "review created");

    let view = review_view(state.users.as_ref(), review).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_one_review_handler(
    State(reviews): State<Reviews>,
    State(users): State<Users>,
    Path(review_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let review = reviews
        .find(review_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Review not found".to_string()))?;

    Ok(Json(review_view(users.as_ref(), review).await?))
}

pub async fn update_review_handler(
    claims: Claims,
    State(reviews): State<Reviews>,
    State(users): State<Users>,
    Path(review_id): Path<Uuid>,
    Json(schema): Json<ReviewPatch>,
) -> Result<impl IntoResponse, AppError> {
    let review = find_own_review(reviews.as_ref(), review_id, claims.sub).await?;
    let (rating, comment) = schema.apply(&review)?;
    let review = reviews.update(review.id, rating, comment).await?;

    Ok(Json(review_view(users.as_ref(), review).await?))
}

pub async fn delete_review_handler(
    claims: Claims,
    State(reviews): State<Reviews>,
    State(purger): State<Purger>,
    State(registry): State<Registry>,
    Path(review_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let review = find_own_review(reviews.as_ref(), review_id, claims.sub).await?;
    let order = registry.cascade_order(ResourceKind::Review);
    purger.purge(ResourceKind::Review, review.id, &order).await?;

    Ok(StatusCode::NO_CONTENT)
}
