//! REST client for the Fruity Fruit storefront backend.
//!
//! # Architecture
//!
//! - `reqwest` for HTTP, JSON bodies in both directions
//! - The backend is the source of truth: stores refetch after every mutation
//! - In-memory caching via `moka` for catalog reads only (5 minute TTL);
//!   cart, wishlist, orders, addresses and profile are never cached
//! - Bearer token attached to every request once the user has logged in
//!
//! # Example
//!
//! ```rust,ignore
//! use fruity_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config)?;
//! client.set_token(Some(token));
//!
//! let cart = client.get_cart().await?;
//! client.add_cart_item(variant_id, 2).await?;
//! ```

mod addresses;
mod auth;
mod cache;
mod cart;
mod catalog;
mod content;
pub mod conversions;
mod orders;
mod profile;
mod shipping;
pub mod types;
mod wishlist;

pub use types::*;

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::StorefrontConfig;

use cache::CacheValue;

/// Prefix every endpoint lives under.
const API_PREFIX: &str = "api/v1/";

/// How much of an error body is kept in logs.
const LOG_BODY_LIMIT: usize = 500;

/// Errors that can occur when talking to the storefront backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Backend answered 2xx but flagged the request as unsuccessful.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or expired bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl ApiError {
    /// Message suitable for showing to the customer, if the backend sent one.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. }
            | Self::Rejected(message)
            | Self::NotFound(message)
            | Self::Unauthorized(message) => Some(message.as_str()),
            _ => None,
        }
    }

    /// Whether the failure originates on the backend or the network rather
    /// than in what the customer asked for.
    #[must_use]
    pub fn is_server_side(&self) -> bool {
        match self {
            Self::Http(_) | Self::Url(_) | Self::Parse(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST API.
///
/// Cheap to clone; all clones share the HTTP connection pool, the bearer
/// token and the catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("fruity-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                token: RwLock::new(None),
                cache,
            }),
        })
    }

    /// Replace the bearer token used for authenticated calls.
    pub fn set_token(&self, token: Option<SecretString>) {
        let mut guard = self
            .inner
            .token
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = token;
    }

    /// Whether a bearer token is currently set.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve an endpoint path (relative to `/api/v1/`).
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self
            .inner
            .base_url
            .join(API_PREFIX)?
            .join(path.trim_start_matches('/'))?)
    }

    /// Start a request, attaching the bearer token when one is set.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        let token = self
            .inner
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match token.as_ref() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response.
    ///
    /// Non-success responses are turned into `ApiError`, preferring the
    /// backend's own `message` over `fallback`.
    async fn send(&self, builder: RequestBuilder, fallback: &str) -> Result<String, ApiError> {
        let response = builder.send().await?;
        read_success_body(response, fallback).await
    }

    /// Send a request and parse the JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let body = self.send(builder, fallback).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body, LOG_BODY_LIMIT),
                "Failed to parse storefront API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose response body is irrelevant (may be `204 No Content`).
    async fn send_unit(&self, builder: RequestBuilder, fallback: &str) -> Result<(), ApiError> {
        self.send(builder, fallback).await.map(|_| ())
    }

    async fn cached(&self, key: &str) -> Option<CacheValue> {
        let hit = self.inner.cache.get(key).await;
        if hit.is_some() {
            debug!(key, "Cache hit");
        }
        hit
    }

    async fn cache_insert(&self, key: String, value: CacheValue) {
        self.inner.cache.insert(key, value).await;
    }

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

/// Turn a response into its body text, or into an `ApiError` for
/// non-success statuses.
async fn read_success_body(response: Response, fallback: &str) -> Result<String, ApiError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(ApiError::RateLimited(retry_after));
    }

    let body = response.text().await?;

    if status.is_success() {
        return Ok(body);
    }

    tracing::error!(
        status = %status,
        body = %truncate(&body, LOG_BODY_LIMIT),
        "Storefront API returned non-success status"
    );

    let message = backend_message(&body).unwrap_or_else(|| fallback.to_string());
    Err(match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => ApiError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

/// Extract the `message` field from a JSON error body.
fn backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
}

fn truncate(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        let config = StorefrontConfig::for_base_url(base, "/tmp/fruity-test").unwrap();
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_joins_under_api_prefix() {
        let client = client("http://localhost:5000");
        assert_eq!(
            client.endpoint("cart").unwrap().as_str(),
            "http://localhost:5000/api/v1/cart"
        );
        assert_eq!(
            client.endpoint("/orders/my-orders/7").unwrap().as_str(),
            "http://localhost:5000/api/v1/orders/my-orders/7"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client("https://shop.example.vn/backend");
        assert_eq!(
            client.endpoint("wishlist").unwrap().as_str(),
            "https://shop.example.vn/backend/api/v1/wishlist"
        );
    }

    #[test]
    fn test_token_toggle() {
        let client = client("http://localhost:5000");
        assert!(!client.has_token());
        client.set_token(Some(SecretString::from("abc".to_string())));
        assert!(client.has_token());
        client.set_token(None);
        assert!(!client.has_token());
    }

    #[test]
    fn test_backend_message_extraction() {
        assert_eq!(
            backend_message(r#"{"message":"Sản phẩm đã hết hàng"}"#).as_deref(),
            Some("Sản phẩm đã hết hàng")
        );
        assert_eq!(backend_message(r#"{"message":"  "}"#), None);
        assert_eq!(backend_message("<html>502</html>"), None);
        assert_eq!(backend_message(r#"{"error":"x"}"#), None);
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 400,
            message: "Số lượng không hợp lệ".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 400 - Số lượng không hợp lệ");
        assert_eq!(err.backend_message(), Some("Số lượng không hợp lệ"));
        assert!(!err.is_server_side());

        let err = ApiError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
        assert_eq!(err.backend_message(), None);
    }

    #[test]
    fn test_server_side_classification() {
        let err = ApiError::Api {
            status: 503,
            message: "down".to_string(),
        };
        assert!(err.is_server_side());
        assert!(!ApiError::NotFound("x".to_string()).is_server_side());
    }
}
