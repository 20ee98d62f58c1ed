use ::config::{Config, Environment};
use serde::Deserialize;
use std::env;
use validator::Validate;
use crate::errors::AppError;
use super::{filter::FilterConfig, server::ServerConfig, storage::StorageConfig};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    pub environment: String,
    #[validate(nested)]
    pub server: ServerConfig,
    #[validate(nested)]
    pub filter: FilterConfig,
    #[validate(nested)]
    pub storage: StorageConfig,
}

/// Loads settings from the `.env` file for the current `ENVIRONMENT`, then
/// from `BLOOMLIST__*` variables (e.g. `BLOOMLIST__FILTER__BIT_COUNT=1024`,
/// `BLOOMLIST__FILTER__HASH_REPETITIONS=1,2,3`).
///
/// # Errors
/// Returns [`AppError::Config`] when a variable cannot be deserialized and
/// [`AppError::Validation`] when a value is out of range.
pub fn load() -> Result<Settings, AppError> {
    let env = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    let env_file = match env.as_str() {
        "production" => ".env.production",
        _ => ".env.development",
    };

    dotenv::from_filename(env_file).ok();

    let config = Config::builder()
        .set_default("environment", env)?
        .add_source(
            Environment::with_prefix("BLOOMLIST")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("filter.hash_repetitions")
                .try_parsing(true),
        )
        .build()?;

    let settings = config.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}
