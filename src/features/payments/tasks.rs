use tracing::warn;
use uuid::Uuid;

use crate::{
    services::mailer::Email,
    utilities::{app_state::AppState, errors::AppError},
};

pub async fn send_payment_receipt(state: &AppState, booking_id: Uuid) -> Result<(), AppError> {
    let Some(payment) = state.payments.find_by_booking(booking_id).await? else {
        warn!(%booking_id, "no payment for booking, receipt skipped");
        return Ok(());
    };
    let Some(booking) = state.bookings.find(booking_id).await? else {
        warn!(%booking_id, "booking vanished before its receipt was sent");
        return Ok(());
    };
    let Some(guest) = state.users.find_by_id(booking.guest_id).await? else {
        warn!(%booking_id, "guest no longer exists, receipt skipped");
        return Ok(());
    };

    let body = format!(
        "Hello {},\n\n\
         We received your payment of ${}.\n\n\
         Transaction: {}\n\
         Booking: {}\n\
         Stay: {} to {}\n",
        guest.username,
        payment.amount,
        payment.transaction_id,
        booking.id,
        booking.check_in_date,
        booking.check_out_date,
    );

    state
        .mailer
        .send(Email {
            subject: "Payment Receipt".to_string(),
            body,
            to: vec![guest.email],
        })
        .await
}
