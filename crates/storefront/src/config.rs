//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `FRUITY_API_BASE_URL` - Backend base URL (default: `http://localhost:5000`)
//! - `FRUITY_SESSION_DIR` - Directory for the session and notification files
//!   (default: `.fruity`)
//! - `FRUITY_ORDER_POLL_SECS` - Order status polling interval (default: 15)
//! - `FRUITY_CARRIER_CODE` - Carrier used for shipping quotes (default: `ghn`)
//! - `FRUITY_DEFAULT_ITEM_WEIGHT_GRAMS` - Weight sent for each cart line when
//!   quoting shipping (default: 500)
//! - `FRUITY_QUANTITY_MIN` / `FRUITY_QUANTITY_MAX` - Cart line quantity bounds
//!   (default: 1 / 99)
//! - `FRUITY_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 15)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use fruity_core::QuantityBounds;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_SESSION_DIR: &str = ".fruity";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend base URL; API paths are resolved under `<base>/api/v1/`
    pub api_base_url: Url,
    /// Directory holding the persisted session and notifications
    pub session_dir: PathBuf,
    /// Order status polling interval
    pub order_poll_interval: Duration,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
    /// Checkout settings
    pub checkout: CheckoutConfig,
    /// Cart line quantity bounds
    pub quantity_bounds: QuantityBounds,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
}

/// Settings used when quoting shipping and placing orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Carrier code sent to the shipping quote endpoint
    pub carrier_code: String,
    /// Weight in grams assumed for every cart line
    pub default_item_weight_grams: u32,
    /// Delivery note attached to new orders
    pub default_order_note: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            carrier_code: "ghn".to_string(),
            default_item_weight_grams: 500,
            default_order_note: "Vui lòng gọi trước khi giao".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(
            "FRUITY_API_BASE_URL",
            &get_env_or_default("FRUITY_API_BASE_URL", DEFAULT_BASE_URL),
        )?;
        let session_dir = PathBuf::from(get_env_or_default("FRUITY_SESSION_DIR", DEFAULT_SESSION_DIR));

        let poll_secs = parse_positive("FRUITY_ORDER_POLL_SECS", 15)?;
        let timeout_secs = parse_positive("FRUITY_HTTP_TIMEOUT_SECS", 15)?;

        let min = parse_env("FRUITY_QUANTITY_MIN", 1u32)?;
        let max = parse_env("FRUITY_QUANTITY_MAX", 99u32)?;
        if min == 0 || min > max {
            return Err(ConfigError::InvalidEnvVar(
                "FRUITY_QUANTITY_MIN".to_string(),
                format!("must be between 1 and FRUITY_QUANTITY_MAX ({max}), got {min}"),
            ));
        }

        let defaults = CheckoutConfig::default();
        let checkout = CheckoutConfig {
            carrier_code: get_env_or_default("FRUITY_CARRIER_CODE", &defaults.carrier_code),
            default_item_weight_grams: parse_env(
                "FRUITY_DEFAULT_ITEM_WEIGHT_GRAMS",
                defaults.default_item_weight_grams,
            )?,
            default_order_note: defaults.default_order_note,
        };

        Ok(Self {
            api_base_url,
            session_dir,
            order_poll_interval: Duration::from_secs(poll_secs),
            http_timeout: Duration::from_secs(timeout_secs),
            checkout,
            quantity_bounds: QuantityBounds::new(min, max),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `base_url` with every other setting at its
    /// default. Used by tests and embedders that do not read the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an absolute URL.
    pub fn for_base_url(base_url: &str, session_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("base_url", base_url)?,
            session_dir: session_dir.into(),
            order_poll_interval: Duration::from_secs(15),
            http_timeout: Duration::from_secs(15),
            checkout: CheckoutConfig::default(),
            quantity_bounds: QuantityBounds::default(),
            sentry_dsn: None,
            sentry_environment: None,
        })
    }

    /// Path of the persisted session file.
    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        self.session_dir.join("session.json")
    }

    /// Path of the persisted notifications file.
    #[must_use]
    pub fn notifications_file(&self) -> PathBuf {
        self.session_dir.join("notifications.json")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse a strictly positive number of seconds.
fn parse_positive(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = parse_env(key, default)?;
    if value == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(value)
}

/// Parse an absolute http(s) URL and make sure its path ends with `/` so
/// relative API paths join underneath it.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("TEST", "http://localhost:5000").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/");

        let url = parse_base_url("TEST", "https://shop.example.vn/backend").unwrap();
        assert_eq!(url.as_str(), "https://shop.example.vn/backend/");
    }

    #[test]
    fn test_parse_base_url_rejects_bad_input() {
        assert!(matches!(
            parse_base_url("TEST", "not a url"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            parse_base_url("TEST", "ftp://files.example.vn"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_for_base_url_defaults() {
        let config = StorefrontConfig::for_base_url("http://127.0.0.1:8080", "/tmp/fruity").unwrap();
        assert_eq!(config.order_poll_interval, Duration::from_secs(15));
        assert_eq!(config.quantity_bounds, QuantityBounds::default());
        assert_eq!(config.checkout.carrier_code, "ghn");
        assert_eq!(config.checkout.default_item_weight_grams, 500);
        assert_eq!(config.session_file(), PathBuf::from("/tmp/fruity/session.json"));
        assert_eq!(
            config.notifications_file(),
            PathBuf::from("/tmp/fruity/notifications.json")
        );
    }

    #[test]
    fn test_checkout_defaults() {
        let checkout = CheckoutConfig::default();
        assert_eq!(checkout.default_order_note, "Vui lòng gọi trước khi giao");
    }
}
