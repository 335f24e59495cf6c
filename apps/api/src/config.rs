//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Signing secret used when `JWT_SECRET` is unset. Startup warns about it.
pub const DEFAULT_JWT_SECRET: &str = "default_secret_change_me";

/// Upper bound for `JWT_LIFETIME_SECS` (one year).
pub const MAX_JWT_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Bind address
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// Connection URL; the scheme selects SQLite or PostgreSQL
    pub database_url: String,

    /// Pool size
    pub db_max_connections: u32,

    /// HS256 secret for signing tokens
    pub jwt_secret: String,

    /// Token lifetime in seconds, `1..=MAX_JWT_LIFETIME_SECS`
    pub jwt_lifetime_secs: i64,

    /// Max request body size in bytes (default: 1MB)
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database_url: "sqlite://kpr.db".to_string(),
            db_max_connections: 5,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_lifetime_secs: 86400, // 24 hours
            max_body_size: 1_048_576,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup. Missing keys take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            jwt_secret: lookup("JWT_SECRET")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.jwt_secret),
            jwt_lifetime_secs: parse_or(&lookup, "JWT_LIFETIME_SECS", defaults.jwt_lifetime_secs)?,
            max_body_size: parse_or(&lookup, "MAX_BODY_SIZE", defaults.max_body_size)?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        if !(1..=MAX_JWT_LIFETIME_SECS).contains(&config.jwt_lifetime_secs) {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }

        Ok(config)
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// True when tokens are signed with [`DEFAULT_JWT_SECRET`].
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:3001");
        assert_eq!(config.database_url, "sqlite://kpr.db");
        assert_eq!(config.jwt_lifetime_secs, 86400);
        assert!(config.uses_default_secret());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/kpr"),
            ("JWT_SECRET", "s3cret"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "postgres://localhost/kpr");
        assert!(!config.uses_default_secret());
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("PORT", "http")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for PORT");

        assert!(load(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[("JWT_LIFETIME_SECS", "-1")]).is_err());
    }

    #[test]
    fn test_jwt_lifetime_is_bounded() {
        let max = MAX_JWT_LIFETIME_SECS.to_string();
        assert_eq!(
            load(&[("JWT_LIFETIME_SECS", max.as_str())]).unwrap().jwt_lifetime_secs,
            MAX_JWT_LIFETIME_SECS
        );

        let over = (MAX_JWT_LIFETIME_SECS + 1).to_string();
        let err = load(&[("JWT_LIFETIME_SECS", over.as_str())]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for JWT_LIFETIME_SECS");

        assert!(load(&[("JWT_LIFETIME_SECS", "9223372036854775")]).is_err());
    }

    #[test]
    fn test_empty_secret_falls_back() {
        assert!(load(&[("JWT_SECRET", "")]).unwrap().uses_default_secret());
    }
}
