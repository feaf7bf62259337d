use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::User;

// -- =====================
// -- IN
// -- =====================
#[derive(Deserialize, Validate, Debug)]
pub struct RegisterSchema {
    #[validate(length(
        min = 3,
        max = 150,
        message = "Username should be long between 3 and 150"
    ))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 72,
        message = "Password should be long between 8 and 72"
    ))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
}

#[derive(Deserialize, Validate, Debug)]
pub struct LoginSchema {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

// -- =====================
// -- OUT
// -- =====================
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct UserOut {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserOut {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct AuthResponse {
    pub user: UserOut,
    pub access_token: String,
}
