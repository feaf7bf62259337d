use tracing_subscriber::EnvFilter;

use crate::utilities::{config::Config, errors::AppError};

/// Installs the global fmt subscriber. `RUST_LOG` wins over `TRACING_LEVEL`.
pub fn init(config: &Config) -> Result<(), AppError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.tracing_level.as_str().to_ascii_lowercase())
            .map_err(|e| AppError::InvalidConfigError(format!("TRACING_LEVEL, {e}")))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| AppError::InternalError(format!("tracing subscriber, {e}")))
}
