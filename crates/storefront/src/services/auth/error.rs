//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;
use crate::session::SessionError;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] fruity_core::EmailError),

    /// Name missing at registration.
    #[error("name is required")]
    MissingName,

    /// Password too short or otherwise invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Backend refused the credentials or request.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Login succeeded but no token came back.
    #[error("login response did not include a token")]
    MissingToken,

    /// Backend call failed.
    #[error("api error: {0}")]
    Api(ApiError),

    /// Session could not be persisted.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected(msg) | ApiError::Unauthorized(msg) => Self::Rejected(msg),
            ApiError::Api { status, message } if status < 500 => Self::Rejected(message),
            other => Self::Api(other),
        }
    }
}

impl AuthError {
    /// Text to show the customer.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidEmail(_) => "Email không hợp lệ.".to_string(),
            Self::MissingName => "Vui lòng nhập họ tên.".to_string(),
            Self::WeakPassword(msg) | Self::Rejected(msg) => msg.clone(),
            Self::MissingToken | Self::Api(_) | Self::Session(_) => {
                "Đã có lỗi xảy ra, vui lòng thử lại.".to_string()
            }
        }
    }

    /// Whether this error should be captured to Sentry.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        match self {
            Self::Api(err) => err.is_server_side(),
            Self::MissingToken | Self::Session(_) => true,
            _ => false,
        }
    }
}
