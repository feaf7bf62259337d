use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    features::registry::ResourceKind,
    services::mailer::Email,
    utilities::{app_state::AppState, errors::AppError},
};

pub async fn notify_listing_created(state: &AppState, listing_id: Uuid) -> Result<(), AppError> {
    let Some(listing) = state.listings.find(listing_id).await? else {
        warn!(%listing_id, "listing vanished before its notification was sent");
        return Ok(());
    };
    if state.config.admin_emails.is_empty() {
        warn!("ADMIN_EMAILS is empty, listing notification skipped");
        return Ok(());
    }

    let owner = state
        .users
        .find_by_id(listing.owner_id)
        .await?
        .map(|user| user.username)
        .unwrap_or_default();

    let body = format!(
        "A new listing has been created:\n\n\
         Title: {}\n\
         Type: {}\n\
         Location: {}\n\
         Price: ${}\n\n\
         Created by: {owner}\n",
        listing.title,
        listing.listing_type.label(),
        listing.location,
        listing.price,
    );

    state
        .mailer
        .send(Email {
            subject: format!("New Listing Created: {}", listing.title),
            body,
            to: state.config.admin_emails.clone(),
        })
        .await
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct CleanupReport {
    pub stale: usize,
    pub purged: usize,
}

/// Finds listings deactivated longer than the configured grace period and,
/// when `purge` is set, deletes them with everything attached.
pub async fn cleanup_inactive_listings(
    state: &AppState,
    purge: bool,
) -> Result<CleanupReport, AppError> {
    let cutoff = Utc::now() - Duration::days(state.config.cleanup_inactive_after_days);
    let stale = state.listings.inactive_since(cutoff).await?;
    let mut report = CleanupReport {
        stale: stale.len(),
        purged: 0,
    };

    if purge {
        let order = state.registry.cascade_order(ResourceKind::Listing);
        for listing in &stale {
            match state.purger.purge(ResourceKind::Listing, listing.id, &order).await {
                Ok(_) => report.purged += 1,
                // Removed by a concurrent request in the meantime.
                Err(AppError::NotFoundError(_)) => {}
                Err(e) => return Err(e),
            }
        }
    }

    info!(
        stale = report.stale,
        purged = report.purged,
        "Found {} inactive listings for cleanup",
        report.stale
    );
    Ok(report)
}
