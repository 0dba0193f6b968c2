//! Unified error handling with Sentry integration.
//!
//! Stores return `Result<T, AppError>`. Front ends show
//! [`AppError::user_message`] to the customer and call [`AppError::report`]
//! so server-side failures reach Sentry.

use std::sync::Arc;

use thiserror::Error;

use crate::api::ApiError;
use crate::services::auth::AuthError;
use crate::session::SessionError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Input rejected before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation requires a logged-in customer.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Unexpected failure.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Failure published to several observers, such as a product listing.
    #[error(transparent)]
    Shared(Arc<AppError>),
}

impl AppError {
    /// Text to show the customer.
    ///
    /// Backend messages and validation text pass through; transport and
    /// internal failures become generic text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => match err {
                ApiError::RateLimited(secs) => {
                    format!("Bạn thao tác quá nhanh, vui lòng thử lại sau {secs} giây.")
                }
                ApiError::Http(_) | ApiError::Url(_) => {
                    "Không thể kết nối tới máy chủ, vui lòng thử lại.".to_string()
                }
                ApiError::Parse(_) => "Máy chủ trả về dữ liệu không hợp lệ.".to_string(),
                ApiError::Unauthorized(_) => {
                    "Phiên đăng nhập đã hết hạn, vui lòng đăng nhập lại.".to_string()
                }
                other => other
                    .backend_message()
                    .map_or_else(|| "Đã có lỗi xảy ra.".to_string(), str::to_string),
            },
            Self::Auth(err) => err.user_message(),
            Self::Validation(msg) | Self::NotFound(msg) => msg.clone(),
            Self::NotAuthenticated => "Vui lòng đăng nhập để tiếp tục.".to_string(),
            Self::Session(_) | Self::Internal(_) => "Đã có lỗi xảy ra.".to_string(),
            Self::Shared(inner) => inner.user_message(),
        }
    }

    /// Whether this error should be captured to Sentry.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        match self {
            Self::Api(err) => err.is_server_side(),
            Self::Auth(err) => err.is_reportable(),
            Self::Session(_) | Self::Internal(_) => true,
            Self::Validation(_) | Self::NotAuthenticated | Self::NotFound(_) => false,
            Self::Shared(inner) => inner.is_reportable(),
        }
    }

    /// Capture server-side errors to Sentry and log them.
    pub fn report(&self) {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "Storefront error");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("variant_id", "31")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order-123".to_string());
        assert_eq!(err.to_string(), "Not found: order-123");

        let err = AppError::Validation("Số lượng phải lớn hơn 0.".to_string());
        assert_eq!(err.to_string(), "Validation error: Số lượng phải lớn hơn 0.");
    }

    #[test]
    fn test_user_message_passes_backend_text() {
        let err = AppError::from(ApiError::Api {
            status: 400,
            message: "Sản phẩm đã hết hàng".to_string(),
        });
        assert_eq!(err.user_message(), "Sản phẩm đã hết hàng");
        assert!(!err.is_reportable());
    }

    #[test]
    fn test_user_message_hides_internal_details() {
        let err = AppError::Internal("lock poisoned at cart.rs".to_string());
        assert_eq!(err.user_message(), "Đã có lỗi xảy ra.");
        assert!(err.is_reportable());

        let err = AppError::from(ApiError::Api {
            status: 502,
            message: "upstream".to_string(),
        });
        assert!(err.is_reportable());
    }

    #[test]
    fn test_shared_error_keeps_inner_kind() {
        let err = AppError::Shared(Arc::new(AppError::from(ApiError::Api {
            status: 500,
            message: "db down".to_string(),
        })));
        assert!(err.is_reportable());
        assert_eq!(err.user_message(), "db down");

        let err = AppError::Shared(Arc::new(AppError::NotFound("slug".to_string())));
        assert!(!err.is_reportable());
        assert_eq!(err.to_string(), "Not found: slug");
    }

    #[test]
    fn test_user_message_rate_limited() {
        let err = AppError::from(ApiError::RateLimited(30));
        assert_eq!(
            err.user_message(),
            "Bạn thao tác quá nhanh, vui lòng thử lại sau 30 giây."
        );
    }

    #[test]
    fn test_not_authenticated_message() {
        assert_eq!(
            AppError::NotAuthenticated.user_message(),
            "Vui lòng đăng nhập để tiếp tục."
        );
        assert!(!AppError::NotAuthenticated.is_reportable());
    }
}
