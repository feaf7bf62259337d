use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    features::{
        bookings::{
            implementations::{find_for_participant, require_guest},
            models::{Booking, BookingStatus},
        },
        payments::{
            gateway::PaymentRequest,
            models::{NewPayment, PaymentStatus},
        },
    },
    services::tasks::Job,
    utilities::{
        app_state::AppState,
        errors::{AppError, FieldErrors},
        jwt::Claims,
    },
};

/// Only live bookings can be paid or have their payment verified.
fn ensure_payable(booking: &Booking) -> Result<(), AppError> {
    if matches!(
        booking.status,
        BookingStatus::Pending | BookingStatus::Confirmed
    ) {
        return Ok(());
    }
    Err(AppError::Validation(FieldErrors::single(
        "booking",
        format!("A {} booking cannot be paid.", booking.status),
    )))
}

pub async fn initiate_payment_handler(
    claims: Claims,
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = find_for_participant(&state, booking_id, claims.sub).await?;
    require_guest(&view.booking, claims.sub, "pay for")?;
    ensure_payable(&view.booking)?;

    let existing = state.payments.find_by_booking(booking_id).await?;
    match &existing {
        Some(payment) if payment.status == PaymentStatus::Completed => {
            return Err(AppError::Validation(FieldErrors::single(
                "booking",
                "This booking has already been paid.",
            )));
        }
        Some(payment)
            if payment.status == PaymentStatus::Pending
                && payment.amount == view.booking.total_price =>
        {
            return Ok((StatusCode::OK, Json(payment.clone())));
        }
        _ => {}
    }

    let guest = state
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;
    let session = state
        .gateway
        .initiate(PaymentRequest {
            booking_id,
            amount: view.booking.total_price.clone(),
            customer_email: guest.email,
            description: format!("Booking at {}", view.listing.title),
        })
        .await?;

    // A failed or outdated payment is replaced in place, booking_id is unique.
    if let Some(payment) = existing {
        let payment = state
            .payments
            .reissue(payment.id, view.booking.total_price, session)
            .await?;
        info!(%booking_id, transaction_id = %payment.transaction_id, amount = %payment.amount, "payment reissued");
        return Ok((StatusCode::OK, Json(payment)));
    }

    let payment = state
        .payments
        .create(NewPayment {
            booking_id,
            amount: view.booking.total_price,
            transaction_id: session.transaction_id,
            checkout_url: session.checkout_url,
        })
        .await?;
    info!(%booking_id, transaction_id = %payment.transaction_id, "payment initiated");

    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn verify_payment_handler(
    claims: Claims,
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = find_for_participant(&state, booking_id, claims.sub).await?;
    require_guest(&view.booking, claims.sub, "verify the payment of")?;

    let payment = state
        .payments
        .find_by_booking(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Payment not found".to_string()))?;
    if payment.status == PaymentStatus::Completed {
        return Ok(Json(payment));
    }

    ensure_payable(&view.booking)?;
    if payment.amount != view.booking.total_price {
        return Err(AppError::Validation(FieldErrors::single(
            "booking",
            "The booking changed after the payment was initiated, initiate it again.",
        )));
    }

    let status = state.gateway.verify(&payment.transaction_id).await?;
    if status == payment.status {
        return Ok(Json(payment));
    }

    let updated = state.payments.update_status(payment.id, status).await?;
    info!(%booking_id, from = %payment.status, to = %updated.status, "payment status updated");

    if updated.status == PaymentStatus::Completed {
        state.tasks.enqueue(Job::PaymentCompleted { booking_id });
    }

    Ok(Json(updated))
}
