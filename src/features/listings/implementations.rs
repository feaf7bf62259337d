use uuid::Uuid;
use validator::Validate;

use crate::{
    features::{
        listings::{
            models::{Listing, ListingChanges, NewListing},
            repository::ListingRepository,
            schemas::{ListingIn, ListingOut, ListingPatch},
        },
        reviews::repository::ReviewRepository,
        users::{
            implementations::{resolve_user, users_by_id},
            repository::UserRepository,
        },
    },
    utilities::errors::AppError,
};

impl ListingIn {
    pub fn into_new_listing(self, owner_id: Uuid) -> Result<NewListing, AppError> {
        self.validate()?;

        Ok(NewListing {
            owner_id,
            title: self.title.trim().to_string(),
            description: self.description,
            listing_type: self.listing_type,
            price: self.price.with_scale(2),
            location: self.location.trim().to_string(),
        })
    }
}

impl ListingPatch {
    /// Overlays the supplied fields on `listing`.
    pub fn apply(self, listing: &Listing) -> Result<ListingChanges, AppError> {
        self.validate()?;

        let mut changes = listing.changes();
        if let Some(title) = self.title {
            changes.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            changes.description = description;
        }
        if let Some(listing_type) = self.listing_type {
            changes.listing_type = listing_type;
        }
        if let Some(price) = self.price {
            changes.price = price.with_scale(2);
        }
        if let Some(location) = self.location {
            changes.location = location.trim().to_string();
        }
        if let Some(is_active) = self.is_active {
            changes.is_active = is_active;
        }
        Ok(changes)
    }
}

/// Loads a listing the public may see.
pub async fn find_active(listings: &dyn ListingRepository, id: Uuid) -> Result<Listing, AppError> {
    listings
        .find(id)
        .await?
        .filter(|listing| listing.is_active)
        .ok_or_else(|| AppError::NotFoundError("Listing not found".to_string()))
}

/// Loads a listing, active or not, that `caller` owns.
pub async fn find_owned(
    listings: &dyn ListingRepository,
    id: Uuid,
    caller: Uuid,
) -> Result<Listing, AppError> {
    let listing = listings
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Listing not found".to_string()))?;

    if listing.owner_id != caller {
        return Err(AppError::PermissionDenied(
            "You do not have permission to modify this listing.".to_string(),
        ));
    }
    Ok(listing)
}

/// Attaches owners and rating summaries to a page of listings.
pub async fn listing_views(
    users: &dyn UserRepository,
    reviews: &dyn ReviewRepository,
    listings: Vec<Listing>,
) -> Result<Vec<ListingOut>, AppError> {
    let ids: Vec<Uuid> = listings.iter().map(|l| l.id).collect();
    let summaries = reviews.summaries(&ids).await?;
    let owners = users_by_id(users, listings.iter().map(|l| l.owner_id)).await?;

    listings
        .into_iter()
        .map(|listing| {
            let owner = resolve_user(&owners, listing.owner_id)?;
            let rating = summaries.get(&listing.id).copied().unwrap_or_default();
            Ok(ListingOut::new(listing, owner, rating))
        })
        .collect()
}
