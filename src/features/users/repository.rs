use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    features::users::models::{NewUser, User},
    services::{database::Database, memory::MemoryStore},
    utilities::errors::{AppError, unique_violation},
};

const DUPLICATE_USER: &str = "A user with that username or email already exists";

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError>;
}

#[async_trait]
impl UserRepository for Database {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, email, password, first_name, last_name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => AppError::Conflict(DUPLICATE_USER.to_string()),
            None => e.into(),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, first_name, last_name, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, first_name, last_name, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, first_name, last_name, created_at FROM users WHERE id = ANY($1)",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables()?;
        if tables
            .users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(AppError::Conflict(DUPLICATE_USER.to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.tables()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .tables()?
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError> {
        Ok(self
            .tables()?
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }
}
