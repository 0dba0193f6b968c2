//! Blog posts and the contact form.

use reqwest::Method;
use tracing::instrument;

use super::cache::CacheValue;
use super::conversions::extract_list;
use super::{ApiClient, ApiError, ContactMessage, MessageResponse, Post};

impl ApiClient {
    /// One page of blog posts.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_posts(&self, page: u32, limit: u32) -> Result<Vec<Post>, ApiError> {
        let mut url = self.endpoint("posts")?;
        url.query_pairs_mut()
            .append_pair("page", &page.max(1).to_string())
            .append_pair("limit", &limit.max(1).to_string());

        let body: serde_json::Value = self
            .send_json(self.request(Method::GET, url), "Failed to fetch posts")
            .await?;
        Ok(extract_list(body, &["data", "posts"])?)
    }

    /// A post by slug.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if no post has that slug.
    #[instrument(skip(self))]
    pub async fn get_post(&self, slug: &str) -> Result<Post, ApiError> {
        let cache_key = format!("post:{slug}");
        if let Some(CacheValue::Post(post)) = self.cached(&cache_key).await {
            return Ok(*post);
        }

        let url = self.endpoint(&format!("posts/{slug}"))?;
        let post: Post = self
            .send_json(self.request(Method::GET, url), "Post not found")
            .await?;

        self.cache_insert(cache_key, CacheValue::Post(Box::new(post.clone())))
            .await;
        Ok(post)
    }

    /// Send the contact form.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, message), fields(subject = %message.subject))]
    pub async fn submit_contact(&self, message: &ContactMessage) -> Result<MessageResponse, ApiError> {
        let url = self.endpoint("contacts")?;
        let body = self
            .send(
                self.request(Method::POST, url).json(message),
                "Gửi liên hệ thất bại",
            )
            .await?;
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }
}
