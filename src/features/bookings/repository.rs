use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    features::bookings::models::{Booking, BookingChanges, BookingStatus, NewBooking},
    services::{database::Database, memory::MemoryStore},
    utilities::errors::AppError,
};

const BOOKING_COLUMNS: &str = "b.id, b.listing_id, b.guest_id, b.check_in_date, b.check_out_date, \
     b.number_of_guests, b.total_price, b.status, b.special_requests, b.created_at, b.updated_at";

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: NewBooking) -> Result<Booking, AppError>;
    async fn find(&self, id: Uuid) -> Result<Option<Booking>, AppError>;
    /// Bookings made by `guest_id`, newest first.
    async fn list_for_guest(
        &self,
        guest_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, AppError>;
    /// Bookings on listings owned by `host_id`, newest first.
    async fn list_for_host(
        &self,
        host_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, AppError>;
    /// Applies `changes` only while the booking is still pending.
    async fn update_details(&self, id: Uuid, changes: BookingChanges)
    -> Result<Booking, AppError>;
    /// Moves the booking from `from` to `to`; fails if someone else moved it first.
    async fn set_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Booking, AppError>;
}

fn changed_concurrently() -> AppError {
    AppError::Conflict("The booking was modified by another request, reload and retry".to_string())
}

#[async_trait]
impl BookingRepository for Database {
    async fn create(&self, booking: NewBooking) -> Result<Booking, AppError> {
        Ok(sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (id, listing_id, guest_id, check_in_date, check_out_date,
                                  number_of_guests, total_price, special_requests)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, listing_id, guest_id, check_in_date, check_out_date, number_of_guests,
                      total_price, status, special_requests, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking.listing_id)
        .bind(booking.guest_id)
        .bind(booking.check_in_date)
        .bind(booking.check_out_date)
        .bind(booking.number_of_guests)
        .bind(&booking.total_price)
        .bind(&booking.special_requests)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        Ok(sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_for_guest(
        &self,
        guest_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, AppError> {
        Ok(sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings b
            WHERE b.guest_id = $1 AND ($2::booking_status IS NULL OR b.status = $2)
            ORDER BY b.created_at DESC, b.id DESC
            "#
        ))
        .bind(guest_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_for_host(
        &self,
        host_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, AppError> {
        Ok(sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings b
            JOIN listings l ON l.id = b.listing_id
            WHERE l.owner_id = $1 AND ($2::booking_status IS NULL OR b.status = $2)
            ORDER BY b.created_at DESC, b.id DESC
            "#
        ))
        .bind(host_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_details(
        &self,
        id: Uuid,
        changes: BookingChanges,
    ) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET check_in_date = $2, check_out_date = $3, number_of_guests = $4,
                total_price = $5, special_requests = $6, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING id, listing_id, guest_id, check_in_date, check_out_date, number_of_guests,
                      total_price, status, special_requests, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.check_in_date)
        .bind(changes.check_out_date)
        .bind(changes.number_of_guests)
        .bind(&changes.total_price)
        .bind(&changes.special_requests)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(changed_concurrently)
    }

    async fn set_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, listing_id, guest_id, check_in_date, check_out_date, number_of_guests,
                      total_price, status, special_requests, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(changed_concurrently)
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create(&self, booking: NewBooking) -> Result<Booking, AppError> {
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            listing_id: booking.listing_id,
            guest_id: booking.guest_id,
            check_in_date: booking.check_in_date,
            check_out_date: booking.check_out_date,
            number_of_guests: booking.number_of_guests,
            total_price: booking.total_price,
            status: BookingStatus::Pending,
            special_requests: booking.special_requests,
            created_at: now,
            updated_at: now,
        };
        self.tables()?.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        Ok(self.tables()?.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn list_for_guest(
        &self,
        guest_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, AppError> {
        let mut bookings: Vec<Booking> = self
            .tables()?
            .bookings
            .iter()
            .filter(|b| b.guest_id == guest_id)
            .filter(|b| status.is_none_or(|status| b.status == status))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(bookings)
    }

    async fn list_for_host(
        &self,
        host_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, AppError> {
        let tables = self.tables()?;
        let hosted: Vec<Uuid> = tables
            .listings
            .iter()
            .filter(|l| l.owner_id == host_id)
            .map(|l| l.id)
            .collect();

        let mut bookings: Vec<Booking> = tables
            .bookings
            .iter()
            .filter(|b| hosted.contains(&b.listing_id))
            .filter(|b| status.is_none_or(|status| b.status == status))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(bookings)
    }

    async fn update_details(
        &self,
        id: Uuid,
        changes: BookingChanges,
    ) -> Result<Booking, AppError> {
        let mut tables = self.tables()?;
        let booking = tables
            .bookings
            .iter_mut()
            .find(|b| b.id == id && b.status == BookingStatus::Pending)
            .ok_or_else(changed_concurrently)?;

        booking.check_in_date = changes.check_in_date;
        booking.check_out_date = changes.check_out_date;
        booking.number_of_guests = changes.number_of_guests;
        booking.total_price = changes.total_price;
        booking.special_requests = changes.special_requests;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }

    async fn set_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Booking, AppError> {
        let mut tables = self.tables()?;
        let booking = tables
            .bookings
            .iter_mut()
            .find(|b| b.id == id && b.status == from)
            .ok_or_else(changed_concurrently)?;

        booking.status = to;
        booking.updated_at = Utc::now();
        Ok(booking.clone())
    }
}
