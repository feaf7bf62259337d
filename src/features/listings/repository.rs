use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    features::{
        listings::{
            models::{Listing, ListingChanges, NewListing},
            schemas::ListingQuery,
        },
        schemas::Pagination,
    },
    services::{database::Database, memory::MemoryStore},
    utilities::errors::AppError,
};

const LISTING_COLUMNS: &str = "l.id, l.owner_id, l.title, l.description, l.listing_type, l.price, \
     l.location, l.is_active, l.created_at, l.updated_at";

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn create(&self, listing: NewListing) -> Result<Listing, AppError>;
    async fn find(&self, id: Uuid) -> Result<Option<Listing>, AppError>;
    /// Active listings matching `query`, one page of them plus the total.
    async fn list(
        &self,
        query: &ListingQuery,
        pagination: Pagination,
    ) -> Result<(Vec<Listing>, i64), AppError>;
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Listing>, AppError>;
    async fn update(&self, id: Uuid, changes: ListingChanges) -> Result<Listing, AppError>;
    /// Deactivated listings last touched before `cutoff`.
    async fn inactive_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Listing>, AppError>;
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ListingQuery) {
    qb.push(" WHERE l.is_active = TRUE");

    if let Some(listing_type) = query.listing_type {
        qb.push(" AND l.listing_type = ").push_bind(listing_type);
    }

    if let Some(location) = &query.location {
        qb.push(" AND l.location ILIKE ")
            .push_bind(format!("%{location}%"));
    }

    if let Some(search) = &query.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (l.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR l.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR l.location ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl ListingRepository for Database {
    async fn create(&self, listing: NewListing) -> Result<Listing, AppError> {
        Ok(sqlx::query_as::<_, Listing>(
            r#"
            INSERT INTO listings (id, owner_id, title, description, listing_type, price, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, owner_id, title, description, listing_type, price, location,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(listing.owner_id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.listing_type)
        .bind(&listing.price)
        .bind(&listing.location)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Listing>, AppError> {
        Ok(sqlx::query_as::<_, Listing>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings l WHERE l.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list(
        &self,
        query: &ListingQuery,
        pagination: Pagination,
    ) -> Result<(Vec<Listing>, i64), AppError> {
        let mut listing_qb = QueryBuilder::new(format!("SELECT {LISTING_COLUMNS} FROM listings l"));
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM listings l");

        push_filters(&mut listing_qb, query);
        push_filters(&mut count_qb, query);

        listing_qb
            .push(" ORDER BY ")
            .push(query.ordering.sql())
            .push(" LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset);

        let listings = listing_qb
            .build_query_as::<Listing>()
            .fetch_all(&self.pool)
            .await?;
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok((listings, total))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Listing>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(sqlx::query_as::<_, Listing>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings l WHERE l.id = ANY($1)"
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update(&self, id: Uuid, changes: ListingChanges) -> Result<Listing, AppError> {
        sqlx::query_as::<_, Listing>(
            r#"
            UPDATE listings
            SET title = $2, description = $3, listing_type = $4, price = $5,
                location = $6, is_active = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING id, owner_id, title, description, listing_type, price, location,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.listing_type)
        .bind(&changes.price)
        .bind(&changes.location)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Listing not found".to_string()))
    }

    async fn inactive_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Listing>, AppError> {
        Ok(sqlx::query_as::<_, Listing>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings l \
             WHERE l.is_active = FALSE AND l.updated_at < $1 ORDER BY l.updated_at"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[async_trait]
impl ListingRepository for MemoryStore {
    async fn create(&self, listing: NewListing) -> Result<Listing, AppError> {
        let now = Utc::now();
        let listing = Listing {
            id: Uuid::new_v4(),
            owner_id: listing.owner_id,
            title: listing.title,
            description: listing.description,
            listing_type: listing.listing_type,
            price: listing.price,
            location: listing.location,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.tables()?.listings.push(listing.clone());
        Ok(listing)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Listing>, AppError> {
        Ok(self.tables()?.listings.iter().find(|l| l.id == id).cloned())
    }

    async fn list(
        &self,
        query: &ListingQuery,
        pagination: Pagination,
    ) -> Result<(Vec<Listing>, i64), AppError> {
        let mut matching: Vec<Listing> = self
            .tables()?
            .listings
            .iter()
            .filter(|l| query.matches(l))
            .cloned()
            .collect();
        matching.sort_by(|a, b| query.ordering.compare(a, b));

        Ok((pagination.slice(&matching), matching.len() as i64))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Listing>, AppError> {
        Ok(self
            .tables()?
            .listings
            .iter()
            .filter(|l| ids.contains(&l.id))
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, changes: ListingChanges) -> Result<Listing, AppError> {
        let mut tables = self.tables()?;
        let listing = tables
            .listings
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| AppError::NotFoundError("Listing not found".to_string()))?;

        listing.title = changes.title;
        listing.description = changes.description;
        listing.listing_type = changes.listing_type;
        listing.price = changes.price;
        listing.location = changes.location;
        listing.is_active = changes.is_active;
        listing.updated_at = Utc::now();
        Ok(listing.clone())
    }

    async fn inactive_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Listing>, AppError> {
        let mut stale: Vec<Listing> = self
            .tables()?
            .listings
            .iter()
            .filter(|l| !l.is_active && l.updated_at < cutoff)
            .cloned()
            .collect();
        stale.sort_by_key(|l| l.updated_at);
        Ok(stale)
    }
}
