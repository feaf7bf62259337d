use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    services::mailer::Email,
    utilities::{app_state::AppState, errors::AppError},
};

pub async fn notify_review_created(state: &AppState, review_id: Uuid) -> Result<(), AppError> {
    let Some(review) = state.reviews.find(review_id).await? else {
        warn!(%review_id, "review vanished before its notification was sent");
        return Ok(());
    };
    let Some(listing) = state.listings.find(review.listing_id).await? else {
        warn!(%review_id, "reviewed listing no longer exists");
        return Ok(());
    };

    let users = state
        .users
        .find_many(&[listing.owner_id, review.reviewer_id])
        .await?;
    let owner_email = users
        .iter()
        .find(|u| u.id == listing.owner_id)
        .map(|u| u.email.clone())
        .unwrap_or_default();
    let reviewer = users
        .iter()
        .find(|u| u.id == review.reviewer_id)
        .map(|u| u.username.clone())
        .unwrap_or_default();

    if owner_email.is_empty() {
        debug!(listing_id = %listing.id, "owner has no email, review notification skipped");
        return Ok(());
    }

    let body = format!(
        "A new review has been added to your listing:\n\n\
         Listing: {}\n\
         Reviewer: {reviewer}\n\
         Rating: {}/5 stars\n\
         Comment: {}\n",
        listing.title, review.rating, review.comment,
    );

    state
        .mailer
        .send(Email {
            subject: format!("New Review for {}", listing.title),
            body,
            to: vec![owner_email],
        })
        .await
}
