use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    features::{
        reviews::{
            aggregation::{RatingRow, RatingSummary},
            models::{NewReview, Review},
            schemas::ReviewFilters,
        },
        schemas::Pagination,
    },
    services::{database::Database, memory::MemoryStore},
    utilities::errors::{AppError, unique_violation},
};

const REVIEW_COLUMNS: &str =
    "id, listing_id, reviewer_id, rating, comment, created_at, updated_at";

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Fails with `DuplicateReview` when the reviewer already reviewed the listing.
    async fn create(&self, review: NewReview) -> Result<Review, AppError>;
    async fn exists_for(&self, listing_id: Uuid, reviewer_id: Uuid) -> Result<bool, AppError>;
    async fn find(&self, id: Uuid) -> Result<Option<Review>, AppError>;
    async fn list(
        &self,
        filters: &ReviewFilters,
        pagination: Pagination,
    ) -> Result<(Vec<Review>, i64), AppError>;
    async fn for_listing(&self, listing_id: Uuid) -> Result<Vec<Review>, AppError>;
    async fn update(&self, id: Uuid, rating: i16, comment: String) -> Result<Review, AppError>;
    /// Rating summaries keyed by listing; listings without reviews are absent.
    async fn summaries(
        &self,
        listing_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, RatingSummary>, AppError>;
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &ReviewFilters) {
    qb.push(" WHERE 1=1");

    if let Some(listing) = filters.listing {
        qb.push(" AND listing_id = ").push_bind(listing);
    }

    if let Some(rating) = filters.rating {
        qb.push(" AND rating = ").push_bind(rating);
    }
}

#[async_trait]
impl ReviewRepository for Database {
    async fn create(&self, review: NewReview) -> Result<Review, AppError> {
        sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (id, listing_id, reviewer_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(review.listing_id)
        .bind(review.reviewer_id)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e).as_deref() {
            Some("reviews_listing_reviewer_key") => AppError::DuplicateReview,
            Some(constraint) => AppError::Conflict(format!("Review violates {constraint}")),
            None => e.into(),
        })
    }

    async fn exists_for(&self, listing_id: Uuid, reviewer_id: Uuid) -> Result<bool, AppError> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE listing_id = $1 AND reviewer_id = $2)",
        )
        .bind(listing_id)
        .bind(reviewer_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Review>, AppError> {
        Ok(sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list(
        &self,
        filters: &ReviewFilters,
        pagination: Pagination,
    ) -> Result<(Vec<Review>, i64), AppError> {
        let mut review_qb = QueryBuilder::new(format!("SELECT {REVIEW_COLUMNS} FROM reviews"));
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM reviews");

        push_filters(&mut review_qb, filters);
        push_filters(&mut count_qb, filters);

        review_qb
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset);

        let reviews = review_qb
            .build_query_as::<Review>()
            .fetch_all(&self.pool)
            .await?;
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((reviews, total))
    }

    async fn for_listing(&self, listing_id: Uuid) -> Result<Vec<Review>, AppError> {
        Ok(sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE listing_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update(&self, id: Uuid, rating: i16, comment: String) -> Result<Review, AppError> {
        sqlx::query_as::<_, Review>(&format!(
            r#"
            UPDATE reviews SET rating = $2, comment = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(rating)
        .bind(comment)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Review not found".to_string()))
    }

    async fn summaries(
        &self,
        listing_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, RatingSummary>, AppError> {
        if listing_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, RatingRow>(
            r#"
            SELECT listing_id,
                   AVG(rating)::float8 AS average_rating,
                   COUNT(*) AS review_count
            FROM reviews
            WHERE listing_id = ANY($1)
            GROUP BY listing_id
            "#,
        )
        .bind(listing_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.listing_id, RatingSummary::from(row)))
            .collect())
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn create(&self, review: NewReview) -> Result<Review, AppError> {
        let mut tables = self.tables()?;
        if tables
            .reviews
            .iter()
            .any(|r| r.listing_id == review.listing_id && r.reviewer_id == review.reviewer_id)
        {
            return Err(AppError::DuplicateReview);
        }

        let now = Utc::now();
        let review = Review {
            id: Uuid::new_v4(),
            listing_id: review.listing_id,
            reviewer_id: review.reviewer_id,
            rating: review.rating,
            comment: review.comment,
            created_at: now,
            updated_at: now,
        };
        tables.reviews.push(review.clone());
        Ok(review)
    }

    async fn exists_for(&self, listing_id: Uuid, reviewer_id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .tables()?
            .reviews
            .iter()
            .any(|r| r.listing_id == listing_id && r.reviewer_id == reviewer_id))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Review>, AppError> {
        Ok(self.tables()?.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn list(
        &self,
        filters: &ReviewFilters,
        pagination: Pagination,
    ) -> Result<(Vec<Review>, i64), AppError> {
        let mut matching: Vec<Review> = self
            .tables()?
            .reviews
            .iter()
            .filter(|r| filters.listing.is_none_or(|listing| r.listing_id == listing))
            .filter(|r| filters.rating.is_none_or(|rating| r.rating == rating))
            .cloned()
            .collect();
        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok((pagination.slice(&matching), matching.len() as i64))
    }

    async fn for_listing(&self, listing_id: Uuid) -> Result<Vec<Review>, AppError> {
        let mut reviews: Vec<Review> = self
            .tables()?
            .reviews
            .iter()
            .filter(|r| r.listing_id == listing_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(reviews)
    }

    async fn update(&self, id: Uuid, rating: i16, comment: String) -> Result<Review, AppError> {
        let mut tables = self.tables()?;
        let review = tables
            .reviews
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFoundError("Review not found".to_string()))?;

        review.rating = rating;
        review.comment = comment;
        review.updated_at = Utc::now();
        Ok(review.clone())
    }

    async fn summaries(
        &self,
        listing_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, RatingSummary>, AppError> {
        let tables = self.tables()?;
        let mut ratings: HashMap<Uuid, Vec<i16>> = HashMap::new();
        for review in tables
            .reviews
            .iter()
            .filter(|r| listing_ids.contains(&r.listing_id))
        {
            ratings.entry(review.listing_id).or_default().push(review.rating);
        }

        Ok(ratings
            .into_iter()
            .map(|(listing_id, ratings)| (listing_id, RatingSummary::from_ratings(ratings)))
            .collect())
    }
}
