use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(FromRow, Clone, PartialEq, Eq, Debug)]
pub struct Review {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub reviewer_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewReview {
    pub listing_id: Uuid,
    pub reviewer_id: Uuid,
    pub rating: i16,
    pub comment: String,
}
