//! `/wishlist` endpoints.

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use fruity_core::ProductId;

use super::conversions::extract_list;
use super::{ApiClient, ApiError, WishlistItem};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddBody {
    product_id: ProductId,
}

impl ApiClient {
    /// Fetch the customer's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_wishlist(&self) -> Result<Vec<WishlistItem>, ApiError> {
        let url = self.endpoint("wishlist")?;
        let body: serde_json::Value = self
            .send_json(
                self.request(Method::GET, url),
                "Không thể tải danh sách yêu thích",
            )
            .await?;
        Ok(extract_list(body, &["data", "items"])?)
    }

    /// Save a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_wishlist(&self, product_id: ProductId) -> Result<(), ApiError> {
        let url = self.endpoint("wishlist")?;
        self.send_unit(
            self.request(Method::POST, url).json(&AddBody { product_id }),
            "Không thể thêm vào danh sách yêu thích",
        )
        .await
    }

    /// Remove a product from the wishlist. A `204` answer is success.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_wishlist(&self, product_id: ProductId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("wishlist/{product_id}"))?;
        self.send_unit(
            self.request(Method::DELETE, url),
            "Không thể xóa khỏi danh sách yêu thích",
        )
        .await
    }
}
