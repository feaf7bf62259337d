use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::features::{reviews::models::Review, users::schemas::UserOut};

// -- =====================
// -- IN
// -- =====================
#[derive(Deserialize, Validate, Debug)]
pub struct ReviewIn {
    /// Required on `/reviews`, taken from the path on `/listings/{id}/reviews`.
    pub listing: Option<Uuid>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: i16,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub comment: String,
}

#[derive(Deserialize, Validate, Default, Debug)]
pub struct ReviewPatch {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5."))]
    pub rating: Option<i16>,
    #[validate(length(max = 5000))]
    pub comment: Option<String>,
}

#[derive(Deserialize, Default, Debug)]
pub struct ReviewFilters {
    pub listing: Option<Uuid>,
    pub rating: Option<i16>,
}

// -- =====================
// -- OUT
// -- =====================
#[derive(Serialize, Clone, Debug)]
pub struct ReviewOut {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub reviewer: UserOut,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewOut {
    pub fn new(review: Review, reviewer: UserOut) -> Self {
        Self {
            id: review.id,
            listing_id: review.listing_id,
            reviewer,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}
