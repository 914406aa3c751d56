//! Runtime settings from environment variables (`.env` honoured via dotenvy).

use crate::error::ConfigError;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/postboard";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub per_page: u32,
    pub body_limit_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            max_connections: 5,
            per_page: 10,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let d = Self::default();
        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(d.database_url),
            bind_addr: lookup("BIND_ADDR").unwrap_or(d.bind_addr),
            max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS", d.max_connections)?,
            per_page: parse(&lookup, "POSTS_PER_PAGE", d.per_page)?,
            body_limit_bytes: parse(&lookup, "BODY_LIMIT_BYTES", d.body_limit_bytes)?,
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            message: format!("'{}' is not a valid number", raw),
        }),
    }
}
