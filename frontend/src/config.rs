use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::info;

use crate::api::DEFAULT_API_BASE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote storefront API (`API`).
    pub api_base_url: String,
    pub host: String,
    pub port: u16,
    /// Glob the tera templates are loaded from.
    pub templates: String,
    pub static_dir: String,
    /// Seconds a product list may sit unused before it is dropped.
    pub list_ttl_secs: u64,
}

impl Config {
    /// Reads the process environment; call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: try_load(&lookup, "API", DEFAULT_API_BASE)?,
            host: try_load(&lookup, "HOST", "127.0.0.1")?,
            port: try_load(&lookup, "PORT", "8080")?,
            templates: try_load(&lookup, "TEMPLATES", "public/**/*.html")?,
            static_dir: try_load(&lookup, "STATIC_DIR", "public/static")?,
            list_ttl_secs: try_load(&lookup, "LIST_TTL_SECS", "1800")?,
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        });

    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
