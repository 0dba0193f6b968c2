//! Blog posts and the contact form.

use tracing::instrument;

use fruity_core::Email;

use crate::api::{ApiClient, ContactMessage, Post};
use crate::error::{AppError, Result};

/// Default page for the post list.
pub const DEFAULT_POST_PAGE: u32 = 1;

/// Default page size for the post list.
pub const DEFAULT_POST_LIMIT: u32 = 5;

#[derive(Clone)]
pub struct ContentService {
    api: ApiClient,
}

impl ContentService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Published posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an API error if the request fails.
    pub async fn posts(&self, page: Option<u32>, limit: Option<u32>) -> Result<Vec<Post>> {
        Ok(self
            .api
            .list_posts(
                page.unwrap_or(DEFAULT_POST_PAGE),
                limit.unwrap_or(DEFAULT_POST_LIMIT),
            )
            .await?)
    }

    /// # Errors
    ///
    /// Returns an API error (`NotFound` for an unknown slug) if the request fails.
    pub async fn post(&self, slug: &str) -> Result<Post> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(AppError::Validation("Thiếu đường dẫn bài viết.".to_string()));
        }
        Ok(self.api.get_post(slug).await?)
    }

    /// Send the contact form. Returns the text to show.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for blank fields or a malformed email.
    #[instrument(skip_all)]
    pub async fn submit_contact(&self, message: ContactMessage) -> Result<String> {
        let message = validate_contact(message)?;
        let response = self.api.submit_contact(&message).await?;
        Ok(response.message.unwrap_or_else(|| {
            "Cảm ơn bạn đã liên hệ! Chúng tôi sẽ phản hồi sớm nhất.".to_string()
        }))
    }
}

fn validate_contact(message: ContactMessage) -> Result<ContactMessage> {
    let message = ContactMessage {
        name: message.name.trim().to_string(),
        email: message.email.trim().to_string(),
        subject: message.subject.trim().to_string(),
        message: message.message.trim().to_string(),
    };
    if message.name.is_empty()
        || message.email.is_empty()
        || message.subject.is_empty()
        || message.message.is_empty()
    {
        return Err(AppError::Validation("Vui lòng điền đầy đủ thông tin.".to_string()));
    }
    Email::parse(&message.email).map_err(|_| AppError::Validation("Email không hợp lệ.".to_string()))?;
    Ok(message)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn contact(email: &str) -> ContactMessage {
        ContactMessage {
            name: " Lan ".to_string(),
            email: email.to_string(),
            subject: "Giao hàng".to_string(),
            message: "Khi nào có sầu riêng?".to_string(),
        }
    }

    #[test]
    fn test_validate_contact() {
        let ok = validate_contact(contact("lan@example.com")).unwrap();
        assert_eq!(ok.name, "Lan");

        assert!(validate_contact(contact("not-an-email")).is_err());
        assert!(validate_contact(ContactMessage::default()).is_err());
    }
}
