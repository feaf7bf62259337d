use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::utilities::{config::Config, errors::AppError};

#[derive(Clone, Debug)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;
        info!("✅ Database connection established.");

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied.");
        Ok(())
    }
}
