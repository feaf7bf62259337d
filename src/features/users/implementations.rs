use std::collections::HashMap;

use bcrypt::{hash, verify};
use uuid::Uuid;
use validator::Validate;

use crate::{
    features::users::{
        models::{NewUser, User},
        repository::UserRepository,
        schemas::{LoginSchema, RegisterSchema, UserOut},
    },
    utilities::errors::AppError,
};

impl RegisterSchema {
    pub fn into_new_user(self, bcrypt_cost: u32) -> Result<NewUser, AppError> {
        self.validate()?;

        Ok(NewUser {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            password_hash: hash(&self.password, bcrypt_cost)?,
            first_name: self.first_name,
            last_name: self.last_name,
        })
    }
}

impl LoginSchema {
    pub async fn verify(&self, users: &dyn UserRepository) -> Result<User, AppError> {
        self.validate()?;

        let user = users
            .find_by_email(&self.email.trim().to_lowercase())
            .await?
            .ok_or(AppError::WrongCredentials)?;

        if !verify(&self.password, &user.password)? {
            return Err(AppError::WrongCredentials);
        }

        Ok(user)
    }
}

/// Loads the public view of every referenced user in one round trip.
pub async fn users_by_id(
    users: &dyn UserRepository,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, UserOut>, AppError> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    Ok(users
        .find_many(&ids)
        .await?
        .iter()
        .map(|user| (user.id, UserOut::from(user)))
        .collect())
}

/// Looks a referenced user up in a batch loaded by [`users_by_id`].
pub fn resolve_user(users: &HashMap<Uuid, UserOut>, id: Uuid) -> Result<UserOut, AppError> {
    users
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::InternalError(format!("user {id} referenced but missing")))
}
