//! `/profile/me` endpoints.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::instrument;

use super::{ApiClient, ApiError, MessageResponse, Profile, ProfileUpdate};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordBody<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

impl ApiClient {
    /// Profile of the logged-in customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<Profile, ApiError> {
        let url = self.endpoint("profile/me")?;
        self.send_json(self.request(Method::GET, url), "Failed to fetch profile")
            .await
    }

    /// Update name, avatar or phone; returns the stored profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, ApiError> {
        let url = self.endpoint("profile/me")?;
        self.send_json(
            self.request(Method::PUT, url).json(update),
            "Failed to update profile",
        )
        .await
    }

    /// Change the account password.
    ///
    /// # Errors
    ///
    /// Returns an error if the current password is wrong or the request fails.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        current: &SecretString,
        new: &SecretString,
    ) -> Result<MessageResponse, ApiError> {
        let url = self.endpoint("profile/me/change-password")?;
        let body = ChangePasswordBody {
            current_password: current.expose_secret(),
            new_password: new.expose_secret(),
        };
        self.send_json(
            self.request(Method::PATCH, url).json(&body),
            "Failed to change password",
        )
        .await
    }
}
