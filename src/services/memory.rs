//! In-process storage backend.
//!
//! Mirrors the PostgreSQL schema closely enough that handlers cannot tell the
//! two apart: the same unique constraints are checked on insert and rows are
//! returned in the same default order. Used by `STORAGE_BACKEND=memory` and
//! by the integration tests.

use std::sync::{Mutex, MutexGuard};

use crate::{
    features::{
        bookings::models::Booking, listings::models::Listing, payments::models::Payment,
        reviews::models::Review, users::models::User,
    },
    utilities::errors::AppError,
};

#[derive(Default, Debug)]
pub struct Tables {
    pub users: Vec<User>,
    pub listings: Vec<Listing>,
    pub reviews: Vec<Review>,
    pub bookings: Vec<Booking>,
    pub payments: Vec<Payment>,
}

#[derive(Default, Debug)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn tables(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::InternalError("memory store lock poisoned".to_string()))
    }
}
