use std::{borrow::Cow, cmp::Ordering};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    features::{
        listings::models::{Listing, ListingType},
        reviews::{aggregation::RatingSummary, schemas::ReviewOut},
        users::schemas::UserOut,
    },
    utilities::errors::{AppError, FieldErrors},
};

fn validate_price(price: &BigDecimal) -> Result<(), ValidationError> {
    let invalid = |message: &'static str| {
        Err(ValidationError::new("price").with_message(Cow::Borrowed(message)))
    };

    if *price < BigDecimal::from(0) {
        return invalid("Price cannot be negative.");
    }
    if price.normalized().as_bigint_and_exponent().1 > 2 {
        return invalid("Price cannot have more than 2 decimal places.");
    }
    if *price >= BigDecimal::from(100_000_000) {
        return invalid("Price cannot have more than 8 digits before the decimal point.");
    }
    Ok(())
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank")
            .with_message(Cow::Borrowed("This field may not be blank.")));
    }
    Ok(())
}

// -- =====================
// -- IN
// -- =====================
#[derive(Deserialize, Validate, Debug)]
pub struct ListingIn {
    #[validate(custom(function = "validate_not_blank"), length(min = 1, max = 200, message = "Title must be between 1 and 200 characters."))]
    pub title: String,
    #[validate(custom(function = "validate_not_blank"), length(min = 1, message = "Description is required."))]
    pub description: String,
    pub listing_type: ListingType,
    #[validate(custom(function = "validate_price"))]
    pub price: BigDecimal,
    #[validate(custom(function = "validate_not_blank"), length(min = 1, max = 100, message = "Location must be between 1 and 100 characters."))]
    pub location: String,
}

#[derive(Deserialize, Validate, Default, Debug)]
pub struct ListingPatch {
    #[validate(custom(function = "validate_not_blank"), length(min = 1, max = 200, message = "Title must be between 1 and 200 characters."))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_not_blank"), length(min = 1, message = "Description is required."))]
    pub description: Option<String>,
    pub listing_type: Option<ListingType>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<BigDecimal>,
    #[validate(custom(function = "validate_not_blank"), length(min = 1, max = 100, message = "Location must be between 1 and 100 characters."))]
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, Default, Debug)]
pub struct ListingFilters {
    pub listing_type: Option<ListingType>,
    pub location: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ListingSortField {
    CreatedAt,
    Price,
    Title,
}

/// Parsed `ordering` parameter, `-created_at` when absent.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ListingOrdering {
    pub field: ListingSortField,
    pub descending: bool,
}

impl Default for ListingOrdering {
    fn default() -> Self {
        Self {
            field: ListingSortField::CreatedAt,
            descending: true,
        }
    }
}

impl ListingOrdering {
    pub const FIELDS: &'static [&'static str] = &["created_at", "price", "title"];

    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(Self::default());
        };

        let (descending, name) = match raw.strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, raw),
        };
        let field = match name {
            "created_at" => ListingSortField::CreatedAt,
            "price" => ListingSortField::Price,
            "title" => ListingSortField::Title,
            _ => {
                return Err(AppError::Validation(FieldErrors::single(
                    "ordering",
                    format!("Cannot order by \"{name}\", choose one of {:?}.", Self::FIELDS),
                )));
            }
        };

        Ok(Self { field, descending })
    }

    pub fn sql(&self) -> &'static str {
        match (self.field, self.descending) {
            (ListingSortField::CreatedAt, false) => "l.created_at ASC, l.id ASC",
            (ListingSortField::CreatedAt, true) => "l.created_at DESC, l.id DESC",
            (ListingSortField::Price, false) => "l.price ASC, l.id ASC",
            (ListingSortField::Price, true) => "l.price DESC, l.id DESC",
            (ListingSortField::Title, false) => "l.title ASC, l.id ASC",
            (ListingSortField::Title, true) => "l.title DESC, l.id DESC",
        }
    }

    pub fn compare(&self, a: &Listing, b: &Listing) -> Ordering {
        let ordering = match self.field {
            ListingSortField::CreatedAt => a.created_at.cmp(&b.created_at),
            ListingSortField::Price => a.price.cmp(&b.price),
            ListingSortField::Title => a.title.cmp(&b.title),
        }
        .then_with(|| a.id.cmp(&b.id));

        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Filters after parsing, as handed to the repository.
#[derive(Clone, Default, Debug)]
pub struct ListingQuery {
    pub listing_type: Option<ListingType>,
    pub location: Option<String>,
    pub search: Option<String>,
    pub ordering: ListingOrdering,
}

impl TryFrom<ListingFilters> for ListingQuery {
    type Error = AppError;

    fn try_from(filters: ListingFilters) -> Result<Self, Self::Error> {
        let non_empty = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            ordering: ListingOrdering::parse(filters.ordering.as_deref())?,
            listing_type: filters.listing_type,
            location: non_empty(filters.location),
            search: non_empty(filters.search),
        })
    }
}

impl ListingQuery {
    /// In-memory equivalent of the SQL `WHERE` clause.
    pub fn matches(&self, listing: &Listing) -> bool {
        let contains = |haystack: &str, needle: &str| {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        };

        listing.is_active
            && self
                .listing_type
                .is_none_or(|listing_type| listing.listing_type == listing_type)
            && self
                .location
                .as_deref()
                .is_none_or(|location| contains(&listing.location, location))
            && self.search.as_deref().is_none_or(|term| {
                contains(&listing.title, term)
                    || contains(&listing.description, term)
                    || contains(&listing.location, term)
            })
    }
}

// -- =====================
// -- OUT
// -- =====================
#[derive(Serialize, Debug)]
pub struct ListingOut {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub listing_type: ListingType,
    pub price: BigDecimal,
    pub location: String,
    pub owner: UserOut,
    pub is_active: bool,
    pub average_rating: f64,
    pub review_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<ReviewOut>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingOut {
    pub fn new(listing: Listing, owner: UserOut, rating: RatingSummary) -> Self {
        Self {
            id: listing.id,
            title: listing.title,
            description: listing.description,
            listing_type: listing.listing_type,
            price: listing.price,
            location: listing.location,
            owner,
            is_active: listing.is_active,
            average_rating: rating.average_rating,
            review_count: rating.review_count,
            reviews: None,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }

    pub fn with_reviews(mut self, reviews: Vec<ReviewOut>) -> Self {
        self.reviews = Some(reviews);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn listing_in(price: &str) -> ListingIn {
        ListingIn {
            title: "Cabin".into(),
            description: "Wooden cabin by the lake".into(),
            listing_type: ListingType::Apartment,
            price: BigDecimal::from_str(price).unwrap(),
            location: "Bled".into(),
        }
    }

    #[test]
    fn price_rules() {
        assert!(listing_in("120.50").validate().is_ok());
        assert!(listing_in("0").validate().is_ok());
        assert!(listing_in("-1").validate().is_err());
        assert!(listing_in("10.005").validate().is_err());
        assert!(listing_in("100000000").validate().is_err());
    }

    #[test]
    fn blank_text_fields_are_rejected() {
        let mut listing = listing_in("50.00");
        listing.title = "   ".into();
        listing.location = "\t".into();

        let fields = FieldErrors::from(listing.validate().unwrap_err());
        assert!(fields.get("title").is_some());
        assert!(fields.get("location").is_some());
        assert!(fields.get("description").is_none());

        let patch = ListingPatch {
            description: Some("  ".into()),
            ..ListingPatch::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn ordering_defaults_to_newest_first() {
        assert_eq!(ListingOrdering::parse(None).unwrap(), ListingOrdering::default());
        assert!(ListingOrdering::default().descending);
    }

    #[test]
    fn ordering_parses_direction() {
        let ordering = ListingOrdering::parse(Some("-price")).unwrap();
        assert_eq!(ordering.field, ListingSortField::Price);
        assert!(ordering.descending);

        let ordering = ListingOrdering::parse(Some("title")).unwrap();
        assert_eq!(ordering.field, ListingSortField::Title);
        assert!(!ordering.descending);

        assert!(ListingOrdering::parse(Some("owner")).is_err());
    }

    #[test]
    fn blank_filters_are_ignored() {
        let query = ListingQuery::try_from(ListingFilters {
            location: Some("  ".into()),
            search: Some("lake".into()),
            ..Default::default()
        })
        .unwrap();

        assert!(query.location.is_none());
        assert_eq!(query.search.as_deref(), Some("lake"));
    }
}
