//! `/auth/*` endpoints.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::instrument;

use fruity_core::Email;

use super::{ApiClient, ApiError, AuthResponse};

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct ResetBody<'a> {
    token: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers
    /// `success: false`.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &SecretString) -> Result<AuthResponse, ApiError> {
        let body = LoginBody {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        self.auth_call("auth/login", &body, "Đăng nhập thất bại").await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers
    /// `success: false`.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        name: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        let body = RegisterBody {
            name,
            email: email.as_str(),
            password: password.expose_secret(),
        };
        self.auth_call("auth/register", &body, "Đăng ký thất bại").await
    }

    /// Request a password reset email.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers
    /// `success: false`.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn forgot_password(&self, email: &Email) -> Result<AuthResponse, ApiError> {
        let body = EmailBody {
            email: email.as_str(),
        };
        self.auth_call(
            "auth/forgot-password",
            &body,
            "Không thể gửi yêu cầu quên mật khẩu.",
        )
        .await
    }

    /// Set a new password using the token from the reset email.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend answers
    /// `success: false`.
    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        token: &SecretString,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        let body = ResetBody {
            token: token.expose_secret(),
            password: password.expose_secret(),
        };
        self.auth_call("auth/reset-password", &body, "Không thể đặt lại mật khẩu.")
            .await
    }

    async fn auth_call<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint(path)?;
        let response: AuthResponse = self
            .send_json(self.request(Method::POST, url).json(body), fallback)
            .await?;

        if !response.success {
            return Err(ApiError::Rejected(
                response
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| fallback.to_string()),
            ));
        }

        Ok(response)
    }
}
