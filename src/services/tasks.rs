//! In-process background jobs.
//!
//! Handlers enqueue after their write succeeded and never wait for the
//! outcome. A fixed pool of workers drains one shared channel; failures are
//! logged and dropped.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    features::{bookings, listings, payments, reviews},
    utilities::{app_state::AppState, errors::AppError},
};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Job {
    ListingCreated { listing_id: Uuid },
    ReviewCreated { review_id: Uuid },
    BookingConfirmed { booking_id: Uuid },
    PaymentCompleted { booking_id: Uuid },
    CleanupInactiveListings,
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListingCreated { .. } => "listing_created",
            Self::ReviewCreated { .. } => "review_created",
            Self::BookingConfirmed { .. } => "booking_confirmed",
            Self::PaymentCompleted { .. } => "payment_completed",
            Self::CleanupInactiveListings => "cleanup_inactive_listings",
        }
    }
}

pub type JobReceiver = mpsc::UnboundedReceiver<Job>;

#[derive(Clone, Debug)]
pub struct TaskQueue {
    sender: mpsc::UnboundedSender<Job>,
}

impl TaskQueue {
    pub fn channel() -> (Self, JobReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Hands `job` to the workers. Never blocks and never fails the caller.
    pub fn enqueue(&self, job: Job) {
        let name = job.name();
        if let Err(e) = self.sender.send(job) {
            error!(job = name, "could not enqueue job, workers are gone: {e}");
        }
    }
}

pub fn spawn_workers(state: AppState, receiver: JobReceiver, count: usize) -> Vec<JoinHandle<()>> {
    let receiver = Arc::new(Mutex::new(receiver));

    (0..count.max(1))
        .map(|worker| {
            let state = state.clone();
            let receiver = receiver.clone();
            tokio::spawn(async move {
                loop {
                    let job = receiver.lock().await.recv().await;
                    match job {
                        Some(job) => run_job(&state, job).await,
                        None => break,
                    }
                }
                info!(worker, "job worker stopped");
            })
        })
        .collect()
}

/// Executes one job to completion, logging instead of returning errors.
pub async fn run_job(state: &AppState, job: Job) {
    let name = job.name();
    let result: Result<(), AppError> = match job {
        Job::ListingCreated { listing_id } => {
            listings::tasks::notify_listing_created(state, listing_id).await
        }
        Job::ReviewCreated { review_id } => {
            reviews::tasks::notify_review_created(state, review_id).await
        }
        Job::BookingConfirmed { booking_id } => {
            bookings::tasks::notify_booking_confirmed(state, booking_id).await
        }
        Job::PaymentCompleted { booking_id } => {
            payments::tasks::send_payment_receipt(state, booking_id).await
        }
        Job::CleanupInactiveListings => listings::tasks::cleanup_inactive_listings(
            state,
            state.config.cleanup_purge,
        )
        .await
        .map(|_| ()),
    };

    match result {
        Ok(()) => info!(job = name, "job finished"),
        Err(e) => error!(job = name, "job failed: {e}"),
    }
}

/// Enqueues the inactive listing sweep every `every_hours`.
pub fn spawn_cleanup_schedule(tasks: TaskQueue, every_hours: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        if every_hours == 0 {
            warn!("CLEANUP_INTERVAL_HOURS is 0, scheduled cleanup disabled");
            return;
        }

        let mut ticker = interval(Duration::from_secs(every_hours * 60 * 60));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            tasks.enqueue(Job::CleanupInactiveListings);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_after_shutdown_does_not_panic() {
        let (tasks, receiver) = TaskQueue::channel();
        drop(receiver);
        tasks.enqueue(Job::CleanupInactiveListings);
    }

    #[test]
    fn jobs_arrive_in_order() {
        let (tasks, mut receiver) = TaskQueue::channel();
        let listing_id = Uuid::new_v4();
        tasks.enqueue(Job::ListingCreated { listing_id });
        tasks.enqueue(Job::CleanupInactiveListings);

        assert_eq!(receiver.try_recv().unwrap(), Job::ListingCreated { listing_id });
        assert_eq!(receiver.try_recv().unwrap(), Job::CleanupInactiveListings);
        assert!(receiver.try_recv().is_err());
    }
}
