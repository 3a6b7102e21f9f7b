//! Runtime settings read from the environment (and `.env` when present).

use crate::error::ConfigError;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/catalog";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    /// Include the underlying error text and source line in 500 responses.
    pub expose_errors: bool,
    /// Run the category and product seeders at startup.
    pub seed: bool,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: DEFAULT_DATABASE_URL.into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            max_connections: 5,
            expose_errors: false,
            seed: false,
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Ok(Settings {
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_connections: parse_number("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"))?
                .unwrap_or(defaults.max_connections),
            expose_errors: parse_flag("APP_DEBUG", get("APP_DEBUG"))?.unwrap_or(defaults.expose_errors),
            seed: parse_flag("SEED_DATABASE", get("SEED_DATABASE"))?.unwrap_or(defaults.seed),
            max_body_bytes: parse_number("MAX_BODY_BYTES", get("MAX_BODY_BYTES"))?
                .unwrap_or(defaults.max_body_bytes),
        })
    }
}

fn parse_number<T: FromStr>(key: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError> {
    raw.map(|value| value.parse().map_err(|_| ConfigError::InvalidValue { key, value }))
        .transpose()
}

fn parse_flag(key: &'static str, raw: Option<String>) -> Result<Option<bool>, ConfigError> {
    raw.map(|value| match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value }),
    })
    .transpose()
}
