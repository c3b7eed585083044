//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BRAMBLE_DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `BRAMBLE_HOST` - Bind address (default: 127.0.0.1)
//! - `BRAMBLE_PORT` - Listen port (default: 4000)
//! - `BRAMBLE_ALLOWED_ORIGIN` - Extra CORS origin appended to the built-in
//!   allow-list (e.g. a preview deployment URL)
//! - `BRAMBLE_UPLOAD_DIR` - Directory for uploaded images (default: uploads)
//! - `BRAMBLE_CACHE_TTL_SECS` - Category cache freshness window (default: 300)
//! - `BRAMBLE_CACHE_CAPACITY` - Category cache keyed-entry bound (default: 1000)
//! - `BRAMBLE_ENV` - `development` or `production` (default: production)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::catalog::cache;

/// Origins always allowed, regardless of environment.
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "https://bramblegoods.shop",
    "https://www.bramblegoods.shop",
];

/// Origin prefixes allowed (preview deployments).
const DEFAULT_ALLOWED_PREFIXES: &[&str] = &["https://bramble-goods-"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// CORS origin allow-list: exact origins plus allowed prefixes.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_prefixes: Vec<String>,
}

impl CorsConfig {
    /// Whether `origin` is allowed: exact match first, then prefix match.
    #[must_use]
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
            || self.allowed_prefixes.iter().any(|p| origin.starts_with(p.as_str()))
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// CORS allow-list
    pub cors: CorsConfig,
    /// Directory uploaded images are written to
    pub upload_dir: PathBuf,
    /// Category cache freshness window
    pub cache_ttl: Duration,
    /// Category cache keyed-entry bound
    pub cache_capacity: u64,
    /// Whether error responses may include detail
    pub development: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(get_required_env("BRAMBLE_DATABASE_URL")?);

        let host: IpAddr = get_env_or_default("BRAMBLE_HOST", "127.0.0.1")
            .parse()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BRAMBLE_HOST".to_owned(), format!("{e}"))
            })?;

        let port: u16 = get_env_or_default("BRAMBLE_PORT", "4000")
            .parse()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BRAMBLE_PORT".to_owned(), format!("{e}"))
            })?;

        let mut allowed_origins: Vec<String> = DEFAULT_ALLOWED_ORIGINS
            .iter()
            .map(ToString::to_string)
            .collect();
        if let Ok(extra) = std::env::var("BRAMBLE_ALLOWED_ORIGIN") {
            let extra = extra.trim().trim_end_matches('/').to_owned();
            if !extra.is_empty() {
                allowed_origins.push(extra);
            }
        }

        let cache_ttl_secs: u64 = get_env_or_default("BRAMBLE_CACHE_TTL_SECS", "300")
            .parse()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BRAMBLE_CACHE_TTL_SECS".to_owned(), format!("{e}"))
            })?;

        let cache_capacity: u64 = get_env_or_default("BRAMBLE_CACHE_CAPACITY", "1000")
            .parse()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BRAMBLE_CACHE_CAPACITY".to_owned(), format!("{e}"))
            })?;

        Ok(Self {
            database_url,
            host,
            port,
            cors: CorsConfig {
                allowed_origins,
                allowed_prefixes: DEFAULT_ALLOWED_PREFIXES
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            },
            upload_dir: PathBuf::from(get_env_or_default("BRAMBLE_UPLOAD_DIR", "uploads")),
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            cache_capacity,
            development: get_env_or_default("BRAMBLE_ENV", "production") == "development",
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            sentry_environment: std::env::var("SENTRY_ENVIRONMENT").ok(),
        })
    }

    /// The socket address to bind.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// A config suitable for unit tests: localhost, in-test defaults.
    #[cfg(test)]
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/bramble_test"),
            host: "127.0.0.1".parse().expect("valid test address"),
            port: 0,
            cors: CorsConfig {
                allowed_origins: DEFAULT_ALLOWED_ORIGINS
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
                allowed_prefixes: DEFAULT_ALLOWED_PREFIXES
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            },
            upload_dir: PathBuf::from("uploads"),
            cache_ttl: cache::DEFAULT_TTL,
            cache_capacity: cache::DEFAULT_CAPACITY,
            development: true,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cors() -> CorsConfig {
        ApiConfig::for_tests().cors
    }

    #[test]
    fn test_exact_origin_allowed() {
        assert!(cors().is_allowed("http://localhost:3000"));
        assert!(cors().is_allowed("https://bramblegoods.shop"));
    }

    #[test]
    fn test_prefix_origin_allowed() {
        assert!(cors().is_allowed("https://bramble-goods-pr-42.vercel.app"));
    }

    #[test]
    fn test_unknown_origin_rejected() {
        assert!(!cors().is_allowed("https://evil.example"));
        // no suffix matching
        assert!(!cors().is_allowed("https://evil.example/bramble-goods-"));
        // scheme matters
        assert!(!cors().is_allowed("ftp://localhost:3000"));
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig::for_tests();
        assert_eq!(config.socket_addr().ip().to_string(), "127.0.0.1");
    }
}
