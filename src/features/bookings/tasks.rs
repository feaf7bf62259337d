use tracing::warn;
use uuid::Uuid;

use crate::{
    services::mailer::Email,
    utilities::{app_state::AppState, errors::AppError},
};

pub async fn notify_booking_confirmed(state: &AppState, booking_id: Uuid) -> Result<(), AppError> {
    let Some(booking) = state.bookings.find(booking_id).await? else {
        warn!(%booking_id, "booking vanished before its confirmation was sent");
        return Ok(());
    };
    let (Some(listing), Some(guest)) = (
        state.listings.find(booking.listing_id).await?,
        state.users.find_by_id(booking.guest_id).await?,
    ) else {
        warn!(%booking_id, "booking references missing rows, confirmation skipped");
        return Ok(());
    };

    let body = format!(
        "Hello {},\n\n\
         Your booking at {} ({}) is confirmed.\n\n\
         Check-in: {}\n\
         Check-out: {}\n\
         Guests: {}\n\
         Total: ${}\n",
        guest.username,
        listing.title,
        listing.location,
        booking.check_in_date,
        booking.check_out_date,
        booking.number_of_guests,
        booking.total_price,
    );

    state
        .mailer
        .send(Email {
            subject: format!("Booking Confirmed: {}", listing.title),
            body,
            to: vec![guest.email],
        })
        .await
}
