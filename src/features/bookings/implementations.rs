use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::{
    features::{
        bookings::{
            models::{Booking, BookingChanges, BookingPolicy, BookingRole, BookingStatus},
            schemas::{BookingIn, BookingOut, BookingPatch},
        },
        listings::models::Listing,
        users::implementations::{resolve_user, users_by_id},
    },
    utilities::{
        app_state::AppState,
        errors::{AppError, FieldErrors},
    },
};

/// Exclusive upper bound of a stored total, `NUMERIC(10, 2)`.
const MAX_TOTAL_PRICE: i64 = 100_000_000;

/// The client controlled part of a booking, before pricing.
#[derive(Clone, Debug)]
pub struct BookingDraft {
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub number_of_guests: i32,
    pub total_price: Option<BigDecimal>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct BookingQuote {
    pub duration_days: i64,
    pub total_price: BigDecimal,
}

/// Checks `draft` against `listing` and prices it.
///
/// Every violated rule is reported, keyed by the request field.
pub fn validate_booking(
    draft: &BookingDraft,
    listing: &Listing,
    today: NaiveDate,
    policy: &BookingPolicy,
) -> Result<BookingQuote, AppError> {
    let mut errors = FieldErrors::new();

    if !listing.is_active {
        errors.add("listing_id", "This listing is not available for booking.");
    }
    if draft.check_out_date <= draft.check_in_date {
        errors.add("check_out_date", "Check-out date must be after check-in date.");
    }
    if policy.reject_past_check_in && draft.check_in_date < today {
        errors.add("check_in_date", "Check-in date cannot be in the past.");
    }
    if draft.number_of_guests < 1 {
        errors.add("number_of_guests", "At least one guest is required.");
    }
    errors.into_result()?;

    let duration_days = (draft.check_out_date - draft.check_in_date).num_days();
    let total_price = (&listing.price * &BigDecimal::from(duration_days)).with_scale(2);
    if total_price >= BigDecimal::from(MAX_TOTAL_PRICE) {
        return Err(AppError::Validation(FieldErrors::single(
            "total_price",
            "Total price cannot have more than 8 digits before the decimal point.",
        )));
    }

    if let Some(claimed) = &draft.total_price {
        if *claimed != total_price {
            return Err(AppError::Validation(FieldErrors::single(
                "total_price",
                format!("Total price must be {total_price} for {duration_days} nights."),
            )));
        }
    }

    Ok(BookingQuote {
        duration_days,
        total_price,
    })
}

/// The caller's relation to `booking`. Hosting wins when a user booked their
/// own listing.
pub fn role_of(booking: &Booking, listing_owner: Uuid, caller: Uuid) -> Option<BookingRole> {
    if caller == listing_owner {
        Some(BookingRole::Host)
    } else if caller == booking.guest_id {
        Some(BookingRole::Guest)
    } else {
        None
    }
}

/// Decides whether `role` may move `booking` to `next`.
pub fn authorize_transition(
    booking: &Booking,
    role: BookingRole,
    next: BookingStatus,
) -> Result<(), AppError> {
    if !booking.status.can_transition_to(next) {
        return Err(AppError::InvalidTransition {
            from: booking.status,
            to: next,
        });
    }

    match (role, next) {
        (BookingRole::Host, _) | (BookingRole::Guest, BookingStatus::Cancelled) => Ok(()),
        (BookingRole::Guest, _) => Err(AppError::PermissionDenied(format!(
            "Only the host can mark a booking as {next}."
        ))),
    }
}

impl From<&BookingIn> for BookingDraft {
    fn from(schema: &BookingIn) -> Self {
        Self {
            check_in_date: schema.check_in_date,
            check_out_date: schema.check_out_date,
            number_of_guests: schema.number_of_guests,
            total_price: schema.total_price.clone(),
        }
    }
}

impl BookingPatch {
    /// Overlays the supplied fields on `booking` and reprices the result.
    pub fn apply(
        self,
        booking: &Booking,
        listing: &Listing,
        today: NaiveDate,
        policy: &BookingPolicy,
    ) -> Result<BookingChanges, AppError> {
        self.validate()?;

        let draft = BookingDraft {
            check_in_date: self.check_in_date.unwrap_or(booking.check_in_date),
            check_out_date: self.check_out_date.unwrap_or(booking.check_out_date),
            number_of_guests: self.number_of_guests.unwrap_or(booking.number_of_guests),
            total_price: self.total_price,
        };
        let quote = validate_booking(&draft, listing, today, policy)?;

        Ok(BookingChanges {
            check_in_date: draft.check_in_date,
            check_out_date: draft.check_out_date,
            number_of_guests: draft.number_of_guests,
            total_price: quote.total_price,
            special_requests: self
                .special_requests
                .unwrap_or_else(|| booking.special_requests.clone()),
        })
    }
}

/// A booking as seen by one of its participants.
#[derive(Debug)]
pub struct ParticipantView {
    pub booking: Booking,
    pub listing: Listing,
    pub role: BookingRole,
}

/// Loads `id` if `caller` is its guest or host; anyone else gets a 404.
pub async fn find_for_participant(
    state: &AppState,
    id: Uuid,
    caller: Uuid,
) -> Result<ParticipantView, AppError> {
    let not_found = || AppError::NotFoundError("Booking not found".to_string());

    let booking = state.bookings.find(id).await?.ok_or_else(not_found)?;
    let listing = state
        .listings
        .find(booking.listing_id)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("booking {id} has no listing")))?;
    let role = role_of(&booking, listing.owner_id, caller).ok_or_else(not_found)?;

    Ok(ParticipantView {
        booking,
        listing,
        role,
    })
}

/// Fails unless `caller` made `booking`.
pub fn require_guest(booking: &Booking, caller: Uuid, action: &str) -> Result<(), AppError> {
    if booking.guest_id == caller {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(format!(
            "Only the guest can {action} this booking."
        )))
    }
}

pub async fn booking_views(
    state: &AppState,
    bookings: Vec<Booking>,
) -> Result<Vec<BookingOut>, AppError> {
    let mut listing_ids: Vec<Uuid> = bookings.iter().map(|b| b.listing_id).collect();
    listing_ids.sort_unstable();
    listing_ids.dedup();

    let titles: HashMap<Uuid, String> = state
        .listings
        .find_many(&listing_ids)
        .await?
        .into_iter()
        .map(|listing| (listing.id, listing.title))
        .collect();
    let guests = users_by_id(state.users.as_ref(), bookings.iter().map(|b| b.guest_id)).await?;

    bookings
        .into_iter()
        .map(|booking| {
            let guest = resolve_user(&guests, booking.guest_id)?;
            let title = titles.get(&booking.listing_id).cloned().unwrap_or_default();
            Ok(BookingOut::new(booking, title, guest))
        })
        .collect()
}

pub async fn booking_view(state: &AppState, booking: Booking) -> Result<BookingOut, AppError> {
    booking_views(state, vec![booking])
        .await?
        .pop()
        .ok_or_else(|| AppError::InternalError("booking view missing".to_string()))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;

    use super::*;
    use crate::features::listings::models::ListingType;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn listing(price: &str) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Sea view room".into(),
            description: "Quiet".into(),
            listing_type: ListingType::Hotel,
            price: BigDecimal::from_str(price).unwrap(),
            location: "Lisbon".into(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn draft(check_in: &str, check_out: &str) -> BookingDraft {
        BookingDraft {
            check_in_date: date(check_in),
            check_out_date: date(check_out),
            number_of_guests: 2,
            total_price: None,
        }
    }

    fn booking(status: BookingStatus) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            guest_id: Uuid::new_v4(),
            check_in_date: date("2024-01-10"),
            check_out_date: date("2024-01-15"),
            number_of_guests: 1,
            total_price: BigDecimal::from(500),
            status,
            special_requests: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn field_errors(error: AppError) -> FieldErrors {
        match error {
            AppError::Validation(fields) => fields,
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn prices_five_nights() {
        let quote = validate_booking(
            &draft("2024-01-10", "2024-01-15"),
            &listing("100.00"),
            date("2024-01-01"),
            &BookingPolicy::default(),
        )
        .unwrap();

        assert_eq!(quote.duration_days, 5);
        assert_eq!(quote.total_price, BigDecimal::from_str("500.00").unwrap());
    }

    #[test]
    fn totals_beyond_the_stored_precision_are_rejected() {
        let policy = BookingPolicy::default();
        let today = date("2024-01-01");

        let error = validate_booking(
            &draft("2024-01-10", "2034-01-01"),
            &listing("99999999.99"),
            today,
            &policy,
        )
        .unwrap_err();
        assert!(field_errors(error).get("total_price").is_some());

        let quote = validate_booking(
            &draft("2024-01-10", "2024-01-11"),
            &listing("99999999.99"),
            today,
            &policy,
        )
        .unwrap();
        assert_eq!(quote.total_price, BigDecimal::from_str("99999999.99").unwrap());
    }

    #[test]
    fn same_day_check_out_is_rejected() {
        let error = validate_booking(
            &draft("2024-01-10", "2024-01-10"),
            &listing("100.00"),
            date("2024-01-01"),
            &BookingPolicy::default(),
        )
        .unwrap_err();

        assert!(field_errors(error).get("check_out_date").is_some());
    }

    #[test]
    fn past_check_in_follows_policy() {
        let past = draft("2024-01-10", "2024-01-12");
        let today = date("2024-02-01");

        let error = validate_booking(&past, &listing("80"), today, &BookingPolicy::default())
            .unwrap_err();
        assert!(field_errors(error).get("check_in_date").is_some());

        let lenient = BookingPolicy {
            reject_past_check_in: false,
        };
        assert!(validate_booking(&past, &listing("80"), today, &lenient).is_ok());
    }

    #[test]
    fn reports_every_broken_rule() {
        let mut bad = draft("2024-01-10", "2024-01-09");
        bad.number_of_guests = 0;
        let mut inactive = listing("10");
        inactive.is_active = false;

        let fields = field_errors(
            validate_booking(&bad, &inactive, date("2024-01-01"), &BookingPolicy::default())
                .unwrap_err(),
        );
        assert!(fields.get("check_out_date").is_some());
        assert!(fields.get("number_of_guests").is_some());
        assert!(fields.get("listing_id").is_some());
    }

    #[test]
    fn client_price_must_match() {
        let mut claimed = draft("2024-01-10", "2024-01-12");
        claimed.total_price = Some(BigDecimal::from(1));
        let error = validate_booking(
            &claimed,
            &listing("100.00"),
            date("2024-01-01"),
            &BookingPolicy::default(),
        )
        .unwrap_err();
        assert!(field_errors(error).get("total_price").is_some());

        claimed.total_price = Some(BigDecimal::from(200));
        assert!(
            validate_booking(
                &claimed,
                &listing("100.00"),
                date("2024-01-01"),
                &BookingPolicy::default()
            )
            .is_ok()
        );
    }

    #[test]
    fn state_machine() {
        use BookingStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn guests_may_only_cancel() {
        let pending = booking(BookingStatus::Pending);

        assert!(authorize_transition(&pending, BookingRole::Guest, BookingStatus::Cancelled).is_ok());
        assert!(matches!(
            authorize_transition(&pending, BookingRole::Guest, BookingStatus::Confirmed),
            Err(AppError::PermissionDenied(_))
        ));
        assert!(authorize_transition(&pending, BookingRole::Host, BookingStatus::Confirmed).is_ok());
    }

    #[test]
    fn terminal_states_reject_everyone() {
        let cancelled = booking(BookingStatus::Cancelled);
        assert!(matches!(
            authorize_transition(&cancelled, BookingRole::Host, BookingStatus::Confirmed),
            Err(AppError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn roles_resolve_from_ownership() {
        let b = booking(BookingStatus::Pending);
        let owner = Uuid::new_v4();

        assert_eq!(role_of(&b, owner, owner), Some(BookingRole::Host));
        assert_eq!(role_of(&b, owner, b.guest_id), Some(BookingRole::Guest));
        assert_eq!(role_of(&b, owner, Uuid::new_v4()), None);
    }
}
