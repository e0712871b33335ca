//! Account configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ACCOUNT_GRAPHQL_ENDPOINT` - GraphQL endpoint of the commerce backend
//!
//! ## Optional
//! - `ACCOUNT_STORE_CODE` - Store view code sent with every request
//! - `ACCOUNT_CACHE_CAPACITY` - Max entries in the local cache (default: 64)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Local cache key under which the customer snapshot is stored.
pub const CUSTOMER_CACHE_KEY: &str = "customer";

/// Time-to-live of the customer snapshot (one month).
pub const CUSTOMER_CACHE_TTL: Duration = Duration::from_secs(2_628_000);

const DEFAULT_CACHE_CAPACITY: u64 = 64;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Account library configuration.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// GraphQL endpoint of the commerce backend
    pub endpoint: Url,
    /// Store view code, sent as the `Store` header when set
    pub store_code: Option<String>,
    /// Customer snapshot cache settings
    pub cache: CacheSettings,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Where and for how long the customer snapshot is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Cache key for the snapshot.
    pub key: String,
    /// Snapshot time-to-live.
    pub ttl: Duration,
    /// Max entries held by the in-memory cache.
    pub capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            key: CUSTOMER_CACHE_KEY.to_string(),
            ttl: CUSTOMER_CACHE_TTL,
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl AccountConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let endpoint = parse_endpoint(
            "ACCOUNT_GRAPHQL_ENDPOINT",
            &get_required_env("ACCOUNT_GRAPHQL_ENDPOINT")?,
        )?;
        let store_code = get_optional_env("ACCOUNT_STORE_CODE");
        let capacity = get_env_or_default(
            "ACCOUNT_CACHE_CAPACITY",
            &DEFAULT_CACHE_CAPACITY.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("ACCOUNT_CACHE_CAPACITY".to_string(), e.to_string())
        })?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            endpoint,
            store_code,
            cache: CacheSettings {
                capacity,
                ..CacheSettings::default()
            },
            sentry_dsn,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and validate an http(s) endpoint URL.
fn parse_endpoint(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
