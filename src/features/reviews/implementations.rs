use uuid::Uuid;
use validator::Validate;

use crate::{
    features::{
        listings::implementations::find_active,
        reviews::{
            models::{NewReview, Review},
            repository::ReviewRepository,
            schemas::{ReviewIn, ReviewOut, ReviewPatch},
        },
        users::{
            implementations::{resolve_user, users_by_id},
            repository::UserRepository,
        },
    },
    services::tasks::Job,
    utilities::{
        app_state::AppState,
        errors::{AppError, FieldErrors},
    },
};

/// Writes `caller`'s review of `listing_id` and schedules the owner email.
pub async fn add_review(
    state: &AppState,
    listing_id: Uuid,
    caller: Uuid,
    schema: ReviewIn,
) -> Result<Review, AppError> {
    schema.validate()?;

    let listing = find_active(state.listings.as_ref(), listing_id).await?;
    if listing.owner_id == caller {
        return Err(AppError::PermissionDenied(
            "You cannot review your own listing.".to_string(),
        ));
    }
    if state.reviews.exists_for(listing.id, caller).await? {
        return Err(AppError::DuplicateReview);
    }

    let review = state
        .reviews
        .create(NewReview {
            listing_id: listing.id,
            reviewer_id: caller,
            rating: schema.rating,
            comment: schema.comment,
        })
        .await?;

    state.tasks.enqueue(Job::ReviewCreated {
        review_id: review.id,
    });
    Ok(review)
}

impl ReviewIn {
    pub fn listing_id(&self) -> Result<Uuid, AppError> {
        self.listing.ok_or_else(|| {
            AppError::Validation(FieldErrors::single("listing", "This field is required."))
        })
    }
}

impl ReviewPatch {
    pub fn apply(self, review: &Review) -> Result<(i16, String), AppError> {
        self.validate()?;

        Ok((
            self.rating.unwrap_or(review.rating),
            self.comment.unwrap_or_else(|| review.comment.clone()),
        ))
    }
}

/// Loads a review for mutation: 404 when absent, 403 when not `caller`'s.
pub async fn find_own_review(
    reviews: &dyn ReviewRepository,
    id: Uuid,
    caller: Uuid,
) -> Result<Review, AppError> {
    let review = reviews
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Review not found".to_string()))?;

    if review.reviewer_id != caller {
        return Err(AppError::PermissionDenied(
            "You can only modify your own reviews.".to_string(),
        ));
    }
    Ok(review)
}

pub async fn review_views(
    users: &dyn UserRepository,
    reviews: Vec<Review>,
) -> Result<Vec<ReviewOut>, AppError> {
    let reviewers = users_by_id(users, reviews.iter().map(|r| r.reviewer_id)).await?;

    reviews
        .into_iter()
        .map(|review| {
            let reviewer = resolve_user(&reviewers, review.reviewer_id)?;
            Ok(ReviewOut::new(review, reviewer))
        })
        .collect()
}

pub async fn review_view(users: &dyn UserRepository, review: Review) -> Result<ReviewOut, AppError> {
    let mut views = review_views(users, vec![review]).await?;
    views
        .pop()
        .ok_or_else(|| AppError::InternalError("review view missing".to_string()))
}
