//! Explicit table of the resources this service exposes.
//!
//! The registry is assembled once at startup and owned by `AppState`. It
//! mounts each resource's routes, publishes its query metadata and is the
//! single source of the delete policy between resources: a resource's
//! `cascades` lists the children removed together with it.

use std::fmt;

use axum::{Json, Router, extract::State, response::IntoResponse};
use serde::Serialize;

use crate::{
    features::{bookings, listings, payments, reviews, users},
    utilities::app_state::{AppState, Registry},
};

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    User,
    Listing,
    Review,
    Booking,
    Payment,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Listing => "listing",
            Self::Review => "review",
            Self::Booking => "booking",
            Self::Payment => "payment",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct ResourceEntry {
    pub kind: ResourceKind,
    pub path: &'static str,
    pub filter_fields: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub ordering_fields: &'static [&'static str],
    pub cascades: &'static [ResourceKind],
    pub routes: fn() -> Router<AppState>,
}

#[derive(Serialize, Debug)]
pub struct ResourceDescription {
    pub name: ResourceKind,
    pub path: &'static str,
    pub filter_fields: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub ordering_fields: &'static [&'static str],
    pub deletes_with_it: Vec<ResourceKind>,
}

#[derive(Clone, Default)]
pub struct ResourceRegistry {
    entries: Vec<ResourceEntry>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry`, replacing an earlier registration of the same kind.
    pub fn register(mut self, entry: ResourceEntry) -> Self {
        self.entries.retain(|existing| existing.kind != entry.kind);
        self.entries.push(entry);
        self
    }

    pub fn standard() -> Self {
        Self::new()
            .register(users::resource())
            .register(listings::resource())
            .register(reviews::resource())
            .register(bookings::resource())
            .register(payments::resource())
    }

    pub fn entry(&self, kind: ResourceKind) -> Option<&ResourceEntry> {
        self.entries.iter().find(|entry| entry.kind == kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.entries.iter().map(|entry| entry.kind)
    }

    pub fn router(&self) -> Router<AppState> {
        self.entries
            .iter()
            .fold(Router::new(), |router, entry| router.merge((entry.routes)()))
    }

    /// Delete order for `root`: every descendant before its parent, `root`
    /// last. Children of unregistered kinds are still visited.
    pub fn cascade_order(&self, root: ResourceKind) -> Vec<ResourceKind> {
        let mut order = Vec::new();
        self.visit(root, &mut order);
        order
    }

    fn visit(&self, kind: ResourceKind, order: &mut Vec<ResourceKind>) {
        if order.contains(&kind) {
            return;
        }
        if let Some(entry) = self.entry(kind) {
            for child in entry.cascades {
                self.visit(*child, order);
            }
        }
        order.push(kind);
    }

    pub fn describe(&self) -> Vec<ResourceDescription> {
        self.entries
            .iter()
            .map(|entry| {
                let mut deletes_with_it = self.cascade_order(entry.kind);
                deletes_with_it.pop();
                ResourceDescription {
                    name: entry.kind,
                    path: entry.path,
                    filter_fields: entry.filter_fields,
                    search_fields: entry.search_fields,
                    ordering_fields: entry.ordering_fields,
                    deletes_with_it,
                }
            })
            .collect()
    }
}

pub async fn describe_resources_handler(State(registry): State<Registry>) -> impl IntoResponse {
    Json(registry.describe())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_deletes_children_before_itself() {
        let registry = ResourceRegistry::standard();
        let order = registry.cascade_order(ResourceKind::Listing);

        assert_eq!(order.last(), Some(&ResourceKind::Listing));
        let position = |kind| order.iter().position(|k| *k == kind).unwrap();
        assert!(position(ResourceKind::Payment) < position(ResourceKind::Booking));
        assert!(position(ResourceKind::Review) < position(ResourceKind::Listing));
        assert!(!order.contains(&ResourceKind::User));
    }

    #[test]
    fn booking_takes_its_payment_along() {
        let registry = ResourceRegistry::standard();
        assert_eq!(
            registry.cascade_order(ResourceKind::Booking),
            vec![ResourceKind::Payment, ResourceKind::Booking]
        );
        assert_eq!(
            registry.cascade_order(ResourceKind::Review),
            vec![ResourceKind::Review]
        );
    }

    #[test]
    fn registering_a_kind_twice_keeps_the_latest() {
        let mut replacement = reviews::resource();
        replacement.path = "/api/v2/reviews";
        let registry = ResourceRegistry::standard().register(replacement);

        assert_eq!(registry.kinds().count(), 5);
        assert_eq!(
            registry.entry(ResourceKind::Review).map(|entry| entry.path),
            Some("/api/v2/reviews")
        );
    }

    #[test]
    fn describe_lists_cascade_children() {
        let registry = ResourceRegistry::standard();
        let listing = registry
            .describe()
            .into_iter()
            .find(|d| d.name == ResourceKind::Listing)
            .unwrap();
        assert_eq!(listing.deletes_with_it.len(), 3);
        assert!(listing.ordering_fields.contains(&"price"));
    }
}
