//! Deletes a resource together with everything registered to go with it.
//!
//! The order comes from [`ResourceRegistry::cascade_order`]; the stores only
//! know how to remove one kind of row reachable from a root.
//!
//! [`ResourceRegistry::cascade_order`]: crate::features::registry::ResourceRegistry::cascade_order

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    features::registry::ResourceKind,
    services::{database::Database, memory::MemoryStore},
    utilities::errors::AppError,
};

/// Rows removed per resource kind.
#[derive(Serialize, Default, Clone, PartialEq, Eq, Debug)]
pub struct PurgeReport(BTreeMap<String, u64>);

impl PurgeReport {
    fn record(&mut self, kind: ResourceKind, removed: u64) {
        *self.0.entry(kind.to_string()).or_default() += removed;
    }

    pub fn removed(&self, kind: ResourceKind) -> u64 {
        self.0.get(&kind.to_string()).copied().unwrap_or_default()
    }
}

#[async_trait]
pub trait PurgeRepository: Send + Sync {
    /// Removes `id` of kind `root` and its dependents, in `order`, atomically.
    /// Returns `NotFoundError` when the root row does not exist.
    async fn purge(
        &self,
        root: ResourceKind,
        id: Uuid,
        order: &[ResourceKind],
    ) -> Result<PurgeReport, AppError>;
}

fn unsupported(root: ResourceKind, kind: ResourceKind) -> AppError {
    AppError::InternalError(format!("no delete rule for {kind} under {root}"))
}

fn delete_statement(root: ResourceKind, kind: ResourceKind) -> Result<&'static str, AppError> {
    use ResourceKind::*;

    Ok(match (root, kind) {
        (Listing, Payment) => {
            "DELETE FROM payments WHERE booking_id IN (SELECT id FROM bookings WHERE listing_id = $1)"
        }
        (Listing, Booking) => "DELETE FROM bookings WHERE listing_id = $1",
        (Listing, Review) => "DELETE FROM reviews WHERE listing_id = $1",
        (Listing, Listing) => "DELETE FROM listings WHERE id = $1",
        (Booking, Payment) => "DELETE FROM payments WHERE booking_id = $1",
        (Booking, Booking) => "DELETE FROM bookings WHERE id = $1",
        (Review, Review) => "DELETE FROM reviews WHERE id = $1",
        (Payment, Payment) => "DELETE FROM payments WHERE id = $1",
        _ => return Err(unsupported(root, kind)),
    })
}

#[async_trait]
impl PurgeRepository for Database {
    async fn purge(
        &self,
        root: ResourceKind,
        id: Uuid,
        order: &[ResourceKind],
    ) -> Result<PurgeReport, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut report = PurgeReport::default();

        for kind in order {
            let removed = sqlx::query(delete_statement(root, *kind)?)
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            if *kind == root && removed == 0 {
                // Dropping the transaction rolls the partial delete back.
                return Err(AppError::NotFoundError(format!("{root} not found")));
            }
            report.record(*kind, removed);
        }

        tx.commit().await?;
        info!(%root, %id, ?report, "purged");
        Ok(report)
    }
}

fn remove_where<T>(rows: &mut Vec<T>, mut matches: impl FnMut(&T) -> bool) -> u64 {
    let before = rows.len();
    rows.retain(|row| !matches(row));
    (before - rows.len()) as u64
}

#[async_trait]
impl PurgeRepository for MemoryStore {
    async fn purge(
        &self,
        root: ResourceKind,
        id: Uuid,
        order: &[ResourceKind],
    ) -> Result<PurgeReport, AppError> {
        use ResourceKind::*;

        let mut tables = self.tables()?;
        let exists = match root {
            Listing => tables.listings.iter().any(|l| l.id == id),
            Booking => tables.bookings.iter().any(|b| b.id == id),
            Review => tables.reviews.iter().any(|r| r.id == id),
            Payment => tables.payments.iter().any(|p| p.id == id),
            User => return Err(unsupported(root, User)),
        };
        if !exists {
            return Err(AppError::NotFoundError(format!("{root} not found")));
        }

        // Resolve the affected bookings up front so payment removal does not
        // depend on whether bookings were already dropped.
        let bookings: Vec<Uuid> = match root {
            Listing => tables
                .bookings
                .iter()
                .filter(|b| b.listing_id == id)
                .map(|b| b.id)
                .collect(),
            Booking => vec![id],
            _ => Vec::new(),
        };

        let mut report = PurgeReport::default();
        for kind in order {
            let removed = match (root, *kind) {
                (Listing, Payment) | (Booking, Payment) => {
                    remove_where(&mut tables.payments, |p| bookings.contains(&p.booking_id))
                }
                (Listing, Booking) | (Booking, Booking) => {
                    remove_where(&mut tables.bookings, |b| bookings.contains(&b.id))
                }
                (Listing, Review) => remove_where(&mut tables.reviews, |r| r.listing_id == id),
                (Listing, Listing) => remove_where(&mut tables.listings, |l| l.id == id),
                (Review, Review) => remove_where(&mut tables.reviews, |r| r.id == id),
                (Payment, Payment) => remove_where(&mut tables.payments, |p| p.id == id),
                (root, kind) => return Err(unsupported(root, kind)),
            };
            report.record(*kind, removed);
        }

        info!(%root, %id, ?report, "purged");
        Ok(report)
    }
}
