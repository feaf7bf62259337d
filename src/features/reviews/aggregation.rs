use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Rating statistics of one listing, derived at read time.
#[derive(Serialize, Clone, Copy, PartialEq, Default, Debug)]
pub struct RatingSummary {
    /// Mean rating, `0` when the listing has no reviews.
    pub average_rating: f64,
    pub review_count: i64,
}

impl RatingSummary {
    pub fn from_ratings(ratings: impl IntoIterator<Item = i16>) -> Self {
        let (sum, count) = ratings
            .into_iter()
            .fold((0i64, 0i64), |(sum, count), r| (sum + i64::from(r), count + 1));

        if count == 0 {
            return Self::default();
        }

        Self {
            average_rating: sum as f64 / count as f64,
            review_count: count,
        }
    }
}

/// Row shape of the per-listing aggregate query.
#[derive(FromRow, Debug)]
pub struct RatingRow {
    pub listing_id: Uuid,
    pub average_rating: f64,
    pub review_count: i64,
}

impl From<RatingRow> for RatingSummary {
    fn from(row: RatingRow) -> Self {
        Self {
            average_rating: row.average_rating,
            review_count: row.review_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_reviews_average_to_zero() {
        let summary = RatingSummary::from_ratings(Vec::new());
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.review_count, 0);
    }

    #[test]
    fn averages_ratings() {
        let summary = RatingSummary::from_ratings([5, 3, 4]);
        assert_eq!(summary.average_rating, 4.0);
        assert_eq!(summary.review_count, 3);
    }

    #[test]
    fn keeps_fractional_means() {
        let summary = RatingSummary::from_ratings([5, 4]);
        assert_eq!(summary.average_rating, 4.5);
    }
}
