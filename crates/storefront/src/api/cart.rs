//! `/cart` endpoints. Never cached.

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use fruity_core::{CartItemId, VariantId};

use super::conversions::convert_cart;
use super::{ApiClient, ApiError, CartItem};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddBody {
    variant_id: VariantId,
    quantity: u32,
}

#[derive(Serialize)]
struct QuantityBody {
    quantity: u32,
}

impl ApiClient {
    /// Fetch and normalize the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Vec<CartItem>, ApiError> {
        let url = self.endpoint("cart")?;
        let request = self
            .request(Method::GET, url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache");
        let body: serde_json::Value = self.send_json(request, "Lỗi lấy giỏ hàng").await?;
        Ok(convert_cart(body)?)
    }

    /// Add `quantity` of a variant to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn add_cart_item(&self, variant_id: VariantId, quantity: u32) -> Result<(), ApiError> {
        let url = self.endpoint("cart")?;
        let body = AddBody {
            variant_id,
            quantity,
        };
        self.send_unit(self.request(Method::POST, url).json(&body), "Lỗi thêm vào giỏ hàng")
            .await
    }

    /// Set the quantity of a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn update_cart_item(&self, item_id: CartItemId, quantity: u32) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("cart/{item_id}"))?;
        self.send_unit(
            self.request(Method::PATCH, url).json(&QuantityBody { quantity }),
            "Lỗi cập nhật giỏ hàng",
        )
        .await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_cart_item(&self, item_id: CartItemId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("cart/{item_id}"))?;
        self.send_unit(self.request(Method::DELETE, url), "Lỗi xóa sản phẩm khỏi giỏ hàng")
            .await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<(), ApiError> {
        let url = self.endpoint("cart")?;
        self.send_unit(self.request(Method::DELETE, url), "Lỗi xóa toàn bộ giỏ hàng")
            .await
    }
}
