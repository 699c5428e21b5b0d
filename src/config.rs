//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

use rust_decimal::Decimal;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Shared secret for the admin area
    pub admin_password: String,

    /// Public URL the survey links and QR code point at
    pub public_base_url: String,

    /// Presenter refresh cadence
    pub poll_interval: Duration,

    /// Share of the total shown next to it, in percent
    pub share_percent: Decimal,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://umfrage_data.db?mode=rwc".to_string());

        let database_max_connections = get("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = get("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = get("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = get("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let admin_password = get("ADMIN_PASSWORD")
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingEnv("ADMIN_PASSWORD"))?;

        let public_base_url = get("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let poll_interval_secs: u64 = get("POLL_INTERVAL_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("POLL_INTERVAL_SECS"))?;
        if poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue("POLL_INTERVAL_SECS"));
        }

        let share_percent: Decimal = get("SHARE_PERCENT")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SHARE_PERCENT"))?;
        if share_percent.is_sign_negative() || share_percent > Decimal::ONE_HUNDRED {
            return Err(ConfigError::InvalidValue("SHARE_PERCENT"));
        }

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            admin_password,
            public_base_url,
            poll_interval: Duration::from_secs(poll_interval_secs),
            share_percent,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
