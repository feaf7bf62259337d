//! Sample data for local development.
//!
//! Goes through the repositories, so it works against either backend, and
//! drives booking statuses through the regular state machine.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom, seq::SliceRandom};
use serde::Serialize;
use tracing::info;

use crate::{
    features::{
        bookings::models::{BookingStatus, NewBooking},
        listings::models::{Listing, ListingType, NewListing},
        reviews::models::NewReview,
        users::models::{NewUser, User},
    },
    utilities::{app_state::AppState, errors::AppError},
};

const SAMPLE_USERS: &[(&str, &str, &str, &str)] = &[
    ("john_doe", "john@example.com", "John", "Doe"),
    ("jane_smith", "jane@example.com", "Jane", "Smith"),
    ("bob_wilson", "bob@example.com", "Bob", "Wilson"),
    ("alice_brown", "alice@example.com", "Alice", "Brown"),
    ("charlie_davis", "charlie@example.com", "Charlie", "Davis"),
    ("diana_miller", "diana@example.com", "Diana", "Miller"),
    ("frank_garcia", "frank@example.com", "Frank", "Garcia"),
    ("grace_martinez", "grace@example.com", "Grace", "Martinez"),
    ("henry_lopez", "henry@example.com", "Henry", "Lopez"),
    ("ivy_anderson", "ivy@example.com", "Ivy", "Anderson"),
];

const SAMPLE_LISTINGS: &[(&str, &str, ListingType, &str, &str)] = &[
    ("Luxury Beach Resort", "Beautiful beachfront resort with stunning ocean views", ListingType::Hotel, "250.00", "Maldives"),
    ("Mountain Lodge Retreat", "Cozy mountain lodge perfect for hiking enthusiasts", ListingType::Hotel, "180.00", "Swiss Alps"),
    ("City Center Hotel", "Modern hotel in the heart of downtown", ListingType::Hotel, "120.00", "New York"),
    ("Historic Castle Hotel", "Stay in a real medieval castle with modern amenities", ListingType::Hotel, "300.00", "Scotland"),
    ("Desert Oasis Resort", "Luxury resort in the middle of the desert", ListingType::Hotel, "220.00", "Dubai"),
    ("Cozy Studio Apartment", "Perfect for solo travelers or couples", ListingType::Apartment, "80.00", "Paris"),
    ("Penthouse with City View", "Luxury penthouse with panoramic city views", ListingType::Apartment, "350.00", "London"),
    ("Beachside Condo", "Modern condo just steps from the beach", ListingType::Apartment, "150.00", "Miami"),
    ("Historic Loft", "Converted warehouse loft in artistic district", ListingType::Apartment, "130.00", "Berlin"),
    ("Family Apartment", "Spacious apartment perfect for families", ListingType::Apartment, "110.00", "Barcelona"),
    ("Scuba Diving Adventure", "Explore coral reefs with certified instructors", ListingType::Activity, "85.00", "Great Barrier Reef"),
    ("Mountain Hiking Tour", "Guided hiking tour through scenic mountain trails", ListingType::Activity, "65.00", "Colorado"),
    ("Wine Tasting Experience", "Premium wine tasting in historic vineyards", ListingType::Activity, "95.00", "Tuscany"),
    ("Safari Adventure", "Wildlife safari with experienced guides", ListingType::Activity, "200.00", "Kenya"),
    ("Northern Lights Tour", "Guided tour to see the magnificent Aurora Borealis", ListingType::Activity, "150.00", "Iceland"),
    ("Fine Dining Excellence", "Michelin-starred restaurant with innovative cuisine", ListingType::Restaurant, "120.00", "Tokyo"),
    ("Traditional Bistro", "Authentic local cuisine in charming atmosphere", ListingType::Restaurant, "45.00", "Lyon"),
    ("Rooftop Restaurant", "Dining with spectacular city skyline views", ListingType::Restaurant, "75.00", "Singapore"),
    ("Seaside Seafood Grill", "Fresh seafood with ocean views", ListingType::Restaurant, "60.00", "Sydney"),
    ("Farm-to-Table Dining", "Organic ingredients from local farms", ListingType::Restaurant, "55.00", "California"),
];

const EXTRA_LOCATIONS: &[&str] = &["New York", "Paris", "Tokyo", "London", "Sydney", "Rome"];

const POSITIVE_COMMENTS: &[&str] = &[
    "Amazing experience! Highly recommended.",
    "Perfect location and excellent service.",
    "Beautiful place with stunning views.",
    "Great value for money.",
    "The staff was incredibly friendly and helpful.",
    "Clean, comfortable, and well-maintained.",
    "Exceeded all expectations!",
    "Would definitely stay/visit again.",
];

const NEUTRAL_COMMENTS: &[&str] = &[
    "Good overall experience.",
    "Nice place, met expectations.",
    "Decent value for the price.",
    "Comfortable and clean.",
    "Standard service, nothing special.",
];

const NEGATIVE_COMMENTS: &[&str] = &[
    "Room was smaller than expected.",
    "Service could be improved.",
    "Overpriced for what you get.",
    "Location was not as advertised.",
    "Had some issues but they were resolved.",
];

const SPECIAL_REQUESTS: &[&str] = &[
    "Late check-in requested",
    "Ground floor room preferred",
    "Quiet room please",
    "Extra towels needed",
    "Airport pickup required",
    "Vegetarian breakfast option",
    "Non-smoking room",
    "Room with balcony preferred",
];

const SEED_PASSWORD: &str = "password123";
const ADMIN_PASSWORD: &str = "admin123";

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct SeedReport {
    pub users: usize,
    pub listings: usize,
    pub reviews: usize,
    pub bookings: usize,
}

pub async fn run(state: &AppState, users: usize, listings: usize) -> Result<SeedReport, AppError> {
    let mut rng = StdRng::from_os_rng();
    let mut report = SeedReport::default();

    let accounts = seed_users(state, users, &mut report).await?;
    if accounts.is_empty() {
        return Err(AppError::ValidationError(
            "At least one user is needed to own the sample listings".to_string(),
        ));
    }

    let created = seed_listings(state, listings, &accounts, &mut rng).await?;
    report.listings = created.len();
    report.reviews = seed_reviews(state, &created, &accounts, &mut rng).await?;
    report.bookings = seed_bookings(state, &created, &accounts, &mut rng).await?;

    info!(?report, "Database seeding completed successfully!");
    Ok(report)
}

/// Returns every sample account, reusing ones created by an earlier run.
async fn seed_users(
    state: &AppState,
    count: usize,
    report: &mut SeedReport,
) -> Result<Vec<User>, AppError> {
    let mut accounts = Vec::new();
    let admin = ("admin", "admin@example.com", "Admin", "User");

    for (username, email, first_name, last_name) in
        std::iter::once(&admin).chain(SAMPLE_USERS.iter().take(count))
    {
        if let Some(existing) = state.users.find_by_email(email).await? {
            accounts.push(existing);
            continue;
        }

        let password = if *email == admin.1 {
            ADMIN_PASSWORD
        } else {
            SEED_PASSWORD
        };
        let user = state
            .users
            .create(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: bcrypt::hash(password, state.config.bcrypt_cost)?,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            })
            .await?;
        report.users += 1;
        accounts.push(user);
    }

    info!("Created {} users", report.users);
    Ok(accounts)
}

async fn seed_listings(
    state: &AppState,
    count: usize,
    accounts: &[User],
    rng: &mut StdRng,
) -> Result<Vec<Listing>, AppError> {
    let mut created = Vec::with_capacity(count);

    for i in 0..count {
        let owner_id = accounts
            .choose(rng)
            .map(|user| user.id)
            .ok_or_else(|| AppError::InternalError("no sample owners".to_string()))?;

        let new_listing = match SAMPLE_LISTINGS.get(i) {
            Some((title, description, listing_type, price, location)) => NewListing {
                owner_id,
                title: title.to_string(),
                description: description.to_string(),
                listing_type: *listing_type,
                price: parse_price(price)?,
                location: location.to_string(),
            },
            None => NewListing {
                owner_id,
                title: format!("Sample Listing {}", i + 1),
                description: format!(
                    "This is a sample listing for testing purposes. Listing number {}.",
                    i + 1
                ),
                listing_type: *ListingType::ALL
                    .choose(rng)
                    .unwrap_or(&ListingType::Hotel),
                price: BigDecimal::from(rng.random_range(5_000_i64..=50_000)) / BigDecimal::from(100),
                location: EXTRA_LOCATIONS
                    .choose(rng)
                    .unwrap_or(&"New York")
                    .to_string(),
            },
        };

        created.push(state.listings.create(new_listing).await?);
    }

    info!("Created {} listings", created.len());
    Ok(created)
}

async fn seed_reviews(
    state: &AppState,
    listings: &[Listing],
    accounts: &[User],
    rng: &mut StdRng,
) -> Result<usize, AppError> {
    let mut count = 0;

    for listing in listings {
        let mut reviewers: Vec<&User> = accounts
            .iter()
            .filter(|user| user.id != listing.owner_id)
            .collect();
        reviewers.shuffle(rng);
        let wanted = rng.random_range(0..=5);

        for reviewer in reviewers.into_iter().take(wanted) {
            let rating: i16 = rng.random_range(1..=5);
            let comments = match rating {
                4..=5 => POSITIVE_COMMENTS,
                3 => NEUTRAL_COMMENTS,
                _ => NEGATIVE_COMMENTS,
            };
            let comment = comments.choose(rng).copied().unwrap_or_default();

            match state
                .reviews
                .create(NewReview {
                    listing_id: listing.id,
                    reviewer_id: reviewer.id,
                    rating,
                    comment: comment.to_string(),
                })
                .await
            {
                Ok(_) => count += 1,
                Err(AppError::DuplicateReview) => {}
                Err(e) => return Err(e),
            }
        }
    }

    info!("Created {count} reviews");
    Ok(count)
}

async fn seed_bookings(
    state: &AppState,
    listings: &[Listing],
    accounts: &[User],
    rng: &mut StdRng,
) -> Result<usize, AppError> {
    let mut count = 0;
    let today = Utc::now().date_naive();

    for listing in listings.iter().filter(|l| {
        matches!(l.listing_type, ListingType::Hotel | ListingType::Apartment)
    }) {
        let mut guests: Vec<&User> = accounts
            .iter()
            .filter(|user| user.id != listing.owner_id)
            .collect();
        guests.shuffle(rng);
        let wanted = rng.random_range(0..=3);

        for guest in guests.into_iter().take(wanted) {
            let check_in_date = today + Duration::days(rng.random_range(1..=90));
            let nights: i64 = rng.random_range(1..=14);
            let special_requests = if rng.random_bool(0.5) {
                SPECIAL_REQUESTS.choose(rng).copied().unwrap_or_default()
            } else {
                ""
            };

            let booking = state
                .bookings
                .create(NewBooking {
                    listing_id: listing.id,
                    guest_id: guest.id,
                    check_in_date,
                    check_out_date: check_in_date + Duration::days(nights),
                    number_of_guests: rng.random_range(1..=6),
                    total_price: (&listing.price * &BigDecimal::from(nights)).with_scale(2),
                    special_requests: special_requests.to_string(),
                })
                .await?;

            let path: &[BookingStatus] = match rng.random_range(0..4) {
                0 => &[],
                1 => &[BookingStatus::Confirmed],
                2 => &[BookingStatus::Cancelled],
                _ => &[BookingStatus::Confirmed, BookingStatus::Completed],
            };
            let mut current = booking.status;
            for next in path {
                state.bookings.set_status(booking.id, current, *next).await?;
                current = *next;
            }
            count += 1;
        }
    }

    info!("Created {count} bookings");
    Ok(count)
}

fn parse_price(raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw)
        .map_err(|e| AppError::InternalError(format!("bad sample price {raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        services::{mailer::LogMailer, memory::MemoryStore, tasks::TaskQueue},
        utilities::config::Config,
    };

    #[tokio::test]
    async fn seeds_the_memory_store() {
        let config = Config {
            bcrypt_cost: 4,
            ..Config::default()
        };
        let (tasks, _receiver) = TaskQueue::channel();
        let state = AppState::from_store(config, Arc::new(MemoryStore::new()), Arc::new(LogMailer), tasks);

        let report = run(&state, 3, 22).await.unwrap();
        assert_eq!(report.users, 4);
        assert_eq!(report.listings, 22);

        let again = run(&state, 3, 0).await.unwrap();
        assert_eq!(again.users, 0);
    }
}
