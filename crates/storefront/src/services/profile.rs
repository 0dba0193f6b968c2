//! Customer profile.

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::api::{ApiClient, Profile, ProfileUpdate};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::auth::validate_password;

#[derive(Clone)]
pub struct ProfileService {
    api: ApiClient,
}

impl ProfileService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns `AppError::NotAuthenticated` without a token, or an API error.
    pub async fn get(&self) -> Result<Profile> {
        self.require_token()?;
        Ok(self.api.get_profile().await?)
    }

    /// Update the given fields; blank values are dropped.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if nothing is left to update.
    #[instrument(skip(self, update))]
    pub async fn update(&self, update: ProfileUpdate) -> Result<Profile> {
        self.require_token()?;
        let update = clean_update(update);
        if update.is_empty() {
            return Err(AppError::Validation("Không có thông tin nào để cập nhật.".to_string()));
        }
        let profile = self.api.update_profile(&update).await?;
        add_breadcrumb("profile", "Profile updated", None);
        Ok(profile)
    }

    /// Change the password. Returns the backend's confirmation message.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the new password is too short or
    /// differs from the confirmation, or an API error.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        current: &SecretString,
        new: &SecretString,
        confirm: &SecretString,
    ) -> Result<String> {
        self.require_token()?;
        if current.expose_secret().is_empty() {
            return Err(AppError::Validation("Vui lòng nhập mật khẩu hiện tại.".to_string()));
        }
        validate_password(new.expose_secret()).map_err(|e| AppError::Validation(e.user_message()))?;
        if new.expose_secret() != confirm.expose_secret() {
            return Err(AppError::Validation("Mật khẩu xác nhận không khớp.".to_string()));
        }

        let response = self.api.change_password(current, new).await?;
        add_breadcrumb("profile", "Password changed", None);
        Ok(response
            .message
            .unwrap_or_else(|| "Đổi mật khẩu thành công.".to_string()))
    }

    fn require_token(&self) -> Result<()> {
        if self.api.has_token() {
            Ok(())
        } else {
            Err(AppError::NotAuthenticated)
        }
    }
}

fn clean_update(update: ProfileUpdate) -> ProfileUpdate {
    let keep = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    ProfileUpdate {
        name: keep(update.name),
        avatar: keep(update.avatar),
        phone: keep(update.phone),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_update_drops_blank_fields() {
        let cleaned = clean_update(ProfileUpdate {
            name: Some("  Lan  ".to_string()),
            avatar: Some("   ".to_string()),
            phone: None,
        });
        assert_eq!(cleaned.name.as_deref(), Some("Lan"));
        assert!(cleaned.avatar.is_none());
        assert!(clean_update(ProfileUpdate::default()).is_empty());
    }
}
