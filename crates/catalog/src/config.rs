//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOPCART_PRODUCTS_URL` - Product catalog endpoint (default: public gist)
//! - `SHOPCART_DISCOUNTS_URL` - Discount rules endpoint (default: public gist)
//! - `SHOPCART_CACHE_DIR` - Directory for cached files (default: .shopcart)
//! - `SHOPCART_FRESHNESS_HOURS` - Catalog refetch threshold (default: 24)
//! - `SHOPCART_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 10)
//! - `SHOPCART_TRACKED_CODES` - Comma-separated codes shown at checkout
//!   (default: VOUCHER,TSHIRT,MUG)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use shopcart_core::ProductCode;
use thiserror::Error;
use url::Url;

const DEFAULT_PRODUCTS_URL: &str = "https://gist.githubusercontent.com/palcalde/6c19259bd32dd6aafa327fa557859c2f/raw/ba51779474a150ee4367cda4f4ffacdcca479887/Products.json";
const DEFAULT_DISCOUNTS_URL: &str = "https://gist.githubusercontent.com/palcalde/6c19259bd32dd6aafa327fa557859c2f/raw/ba51779474a150ee4367cda4f4ffacdcca479887/Discounts.json";
const DEFAULT_CACHE_DIR: &str = ".shopcart";
const DEFAULT_FRESHNESS_HOURS: &str = "24";
const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "10";
const DEFAULT_TRACKED_CODES: &str = "VOUCHER,TSHIRT,MUG";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Endpoint returning `{"products": [...]}`
    pub products_url: Url,
    /// Endpoint returning `{"discounts": {...}}`
    pub discounts_url: Url,
    /// Directory holding the product store and cached discount rules
    pub cache_dir: PathBuf,
    /// Maximum age of the persisted catalog before it is refetched
    pub freshness: TimeDelta,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Product codes listed in checkout summaries
    pub tracked_codes: Vec<ProductCode>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if any variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let products_url = parse_url(
            "SHOPCART_PRODUCTS_URL",
            &get_env_or_default("SHOPCART_PRODUCTS_URL", DEFAULT_PRODUCTS_URL),
        )?;
        let discounts_url = parse_url(
            "SHOPCART_DISCOUNTS_URL",
            &get_env_or_default("SHOPCART_DISCOUNTS_URL", DEFAULT_DISCOUNTS_URL),
        )?;
        let cache_dir = PathBuf::from(get_env_or_default("SHOPCART_CACHE_DIR", DEFAULT_CACHE_DIR));
        let freshness = parse_hours(
            "SHOPCART_FRESHNESS_HOURS",
            &get_env_or_default("SHOPCART_FRESHNESS_HOURS", DEFAULT_FRESHNESS_HOURS),
        )?;
        let request_timeout = get_env_or_default(
            "SHOPCART_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPCART_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;
        let tracked_codes = parse_tracked_codes(
            "SHOPCART_TRACKED_CODES",
            &get_env_or_default("SHOPCART_TRACKED_CODES", DEFAULT_TRACKED_CODES),
        )?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            products_url,
            discounts_url,
            cache_dir,
            freshness,
            request_timeout,
            tracked_codes,
            sentry_dsn,
        })
    }

    /// Path of the persisted product store.
    #[must_use]
    pub fn products_path(&self) -> PathBuf {
        self.cache_dir.join("products.json")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_hours(key: &str, value: &str) -> Result<TimeDelta, ConfigError> {
    let hours = value
        .trim()
        .parse::<i64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if hours < 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    TimeDelta::try_hours(hours)
        .ok_or_else(|| ConfigError::InvalidEnvVar(key.to_string(), "out of range".to_string()))
}

fn parse_tracked_codes(key: &str, value: &str) -> Result<Vec<ProductCode>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| {
            ProductCode::parse(code)
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), format!("{code}: {e}")))
        })
        .collect()
}
