//! Authentication service.
//!
//! Logs customers in against the backend and keeps the resulting bearer
//! token in the session store so later runs start authenticated.

mod error;

pub use error::{AuthError, MIN_PASSWORD_LENGTH};

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument};

use fruity_core::Email;

use crate::api::{ApiClient, User};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::session::{Session, SessionStore};

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    sessions: Arc<dyn SessionStore>,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(api: ApiClient, sessions: Arc<dyn SessionStore>) -> Self {
        Self { api, sessions }
    }

    /// Re-attach the token of a saved session to the API client.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the saved session cannot be read.
    pub fn restore(&self) -> Result<Option<User>, AuthError> {
        let session = self.sessions.load()?;
        self.api.set_token(
            session
                .token
                .as_ref()
                .map(|t| SecretString::from(t.expose_secret().to_owned())),
        );
        if let Some(user) = &session.user {
            set_sentry_user(&user.id, Some(&user.email));
        }
        Ok(session.user)
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::Rejected` with the backend's message if the
    /// credentials are wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Option<User>, AuthError> {
        let email = Email::parse(email)?;

        let response = self.api.login(&email, password).await?;
        let token = response
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or(AuthError::MissingToken)?;

        // Keep the checkout address picked before a re-login.
        let previous = self.sessions.load().unwrap_or_default();
        let mut session = Session::logged_in(SecretString::from(token.clone()), response.user.clone());
        session.selected_address_id = previous.selected_address_id;
        self.sessions.save(&session)?;

        self.api.set_token(Some(SecretString::from(token)));
        if let Some(user) = &response.user {
            set_sentry_user(&user.id, Some(&user.email));
        }
        add_breadcrumb("auth", "Logged in", None);
        info!("Customer logged in");

        Ok(response.user)
    }

    /// Register a new account. Returns the backend's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail`, `AuthError::MissingName` or
    /// `AuthError::WeakPassword` for bad input, `AuthError::Rejected` if the
    /// backend refuses (e.g. email already registered).
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<String, AuthError> {
        let email = Email::parse(email)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        validate_password(password.expose_secret())?;

        let response = self.api.register(name, &email, password).await?;
        add_breadcrumb("auth", "Registered", None);

        Ok(response
            .message
            .unwrap_or_else(|| "Đăng ký thành công".to_string()))
    }

    /// Ask the backend to email a reset link.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed address or
    /// `AuthError::Rejected` if the backend refuses.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<String, AuthError> {
        let email = Email::parse(email)?;
        let response = self.api.forgot_password(&email).await?;
        Ok(response
            .message
            .unwrap_or_else(|| "Vui lòng kiểm tra email để đặt lại mật khẩu.".to_string()))
    }

    /// Set a new password from a reset token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the new password is too short or
    /// `AuthError::Rejected` if the token is invalid or expired.
    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        token: &SecretString,
        password: &SecretString,
    ) -> Result<String, AuthError> {
        if token.expose_secret().trim().is_empty() {
            return Err(AuthError::Rejected("Liên kết đặt lại mật khẩu không hợp lệ.".to_string()));
        }
        validate_password(password.expose_secret())?;

        let response = self.api.reset_password(token, password).await?;
        Ok(response
            .message
            .unwrap_or_else(|| "Đặt lại mật khẩu thành công.".to_string()))
    }

    /// Forget the session and the bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the saved session cannot be removed.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.api.set_token(None);
        self.sessions.clear()?;
        clear_sentry_user();
        add_breadcrumb("auth", "Logged out", None);
        info!("Customer logged out");
        Ok(())
    }

    /// Whether a bearer token is set.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.api.has_token()
    }

    /// The logged-in user, as saved at login.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the saved session cannot be read.
    pub fn current_user(&self) -> Result<Option<User>, AuthError> {
        Ok(self.sessions.load()?.user)
    }
}

/// Validate password meets requirements.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Mật khẩu phải có ít nhất {MIN_PASSWORD_LENGTH} ký tự."
        )));
    }
    Ok(())
}
