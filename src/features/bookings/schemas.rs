use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::features::{
    bookings::models::{Booking, BookingRole, BookingStatus},
    users::schemas::UserOut,
};

fn default_guests() -> i32 {
    1
}

// -- =====================
// -- IN
// -- =====================
#[derive(Deserialize, Validate, Clone, Debug)]
pub struct BookingIn {
    pub listing_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    #[serde(default = "default_guests")]
    #[validate(range(min = 1, message = "At least one guest is required."))]
    pub number_of_guests: i32,
    pub total_price: Option<BigDecimal>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub special_requests: String,
}

#[derive(Deserialize, Validate, Default, Debug)]
pub struct BookingPatch {
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "At least one guest is required."))]
    pub number_of_guests: Option<i32>,
    pub total_price: Option<BigDecimal>,
    #[validate(length(max = 2000))]
    pub special_requests: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct StatusIn {
    pub status: BookingStatus,
}

#[derive(Deserialize, Default, Debug)]
pub struct BookingFilters {
    pub role: Option<BookingRole>,
    pub status: Option<BookingStatus>,
}

// -- =====================
// -- OUT
// -- =====================
#[derive(Serialize, Debug)]
pub struct BookingOut {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub listing_title: String,
    pub guest: UserOut,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub duration_days: i64,
    pub number_of_guests: i32,
    pub total_price: BigDecimal,
    pub status: BookingStatus,
    pub special_requests: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingOut {
    pub fn new(booking: Booking, listing_title: String, guest: UserOut) -> Self {
        Self {
            duration_days: booking.duration_days(),
            id: booking.id,
            listing_id: booking.listing_id,
            listing_title,
            guest,
            check_in_date: booking.check_in_date,
            check_out_date: booking.check_out_date,
            number_of_guests: booking.number_of_guests,
            total_price: booking.total_price,
            status: booking.status,
            special_requests: booking.special_requests,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}
