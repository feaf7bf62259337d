use std::{fmt, str::FromStr};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

#[derive(Type, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "listing_type", rename_all = "lowercase")]
pub enum ListingType {
    #[default]
    Hotel,
    Apartment,
    Activity,
    Restaurant,
}

impl ListingType {
    pub const ALL: [ListingType; 4] = [
        ListingType::Hotel,
        ListingType::Apartment,
        ListingType::Activity,
        ListingType::Restaurant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hotel => "hotel",
            Self::Apartment => "apartment",
            Self::Activity => "activity",
            Self::Restaurant => "restaurant",
        }
    }

    /// Human readable name, used in notification emails.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hotel => "Hotel",
            Self::Apartment => "Apartment",
            Self::Activity => "Activity",
            Self::Restaurant => "Restaurant",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("\"{s}\" is not a valid listing type"))
    }
}

#[derive(FromRow, Clone, PartialEq, Debug)]
pub struct Listing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub listing_type: ListingType,
    pub price: BigDecimal,
    pub location: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewListing {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub listing_type: ListingType,
    pub price: BigDecimal,
    pub location: String,
}

/// Full set of editable columns after a partial update was applied.
#[derive(Clone, Debug)]
pub struct ListingChanges {
    pub title: String,
    pub description: String,
    pub listing_type: ListingType,
    pub price: BigDecimal,
    pub location: String,
    pub is_active: bool,
}

impl Listing {
    pub fn changes(&self) -> ListingChanges {
        ListingChanges {
            title: self.title.clone(),
            description: self.description.clone(),
            listing_type: self.listing_type,
            price: self.price.clone(),
            location: self.location.clone(),
            is_active: self.is_active,
        }
    }
}
