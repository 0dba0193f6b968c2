//! Catalog endpoints: products, variants, reviews and categories.
//!
//! These are the only reads that go through the cache. Free-text searches
//! always hit the backend.

use reqwest::Method;
use tracing::instrument;

use fruity_core::ProductId;

use super::cache::CacheValue;
use super::conversions::extract_list;
use super::{ApiClient, ApiError, Category, ProductFilters, ProductPage, Review, Variant};

impl ApiClient {
    /// List products matching `filters`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, filters: &ProductFilters) -> Result<ProductPage, ApiError> {
        let pairs = filters.query_pairs();
        let cache_key = format!("products:{pairs:?}");

        if !filters.is_search()
            && let Some(CacheValue::Products(page)) = self.cached(&cache_key).await
        {
            return Ok(*page);
        }

        let mut url = self.endpoint("products")?;
        if !pairs.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
        }

        let page: ProductPage = self
            .send_json(self.request(Method::GET, url), "Lỗi tải sản phẩm")
            .await?;

        if !filters.is_search() {
            self.cache_insert(cache_key, CacheValue::Products(Box::new(page.clone())))
                .await;
        }

        Ok(page)
    }

    /// Variants of a product, in backend order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product_variants(&self, product_id: ProductId) -> Result<Vec<Variant>, ApiError> {
        let cache_key = format!("variants:{product_id}");
        if let Some(CacheValue::Variants(variants)) = self.cached(&cache_key).await {
            return Ok(variants);
        }

        let url = self.endpoint(&format!("products/{product_id}/variants"))?;
        let body: serde_json::Value = self
            .send_json(self.request(Method::GET, url), "Fetch variants lỗi")
            .await?;
        let variants: Vec<Variant> = extract_list(body, &["data", "variants"])?;

        self.cache_insert(cache_key, CacheValue::Variants(variants.clone()))
            .await;
        Ok(variants)
    }

    /// Reviews of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, ApiError> {
        let cache_key = format!("reviews:{product_id}");
        if let Some(CacheValue::Reviews(reviews)) = self.cached(&cache_key).await {
            return Ok(reviews);
        }

        let url = self.endpoint(&format!("reviews/products/{product_id}/reviews"))?;
        let body: serde_json::Value = self
            .send_json(self.request(Method::GET, url), "Fetch reviews lỗi")
            .await?;
        let reviews: Vec<Review> = extract_list(body, &["data", "reviews"])?;

        self.cache_insert(cache_key, CacheValue::Reviews(reviews.clone()))
            .await;
        Ok(reviews)
    }

    /// The full category tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        let cache_key = "categories:tree";
        if let Some(CacheValue::Categories(tree)) = self.cached(cache_key).await {
            return Ok(tree);
        }

        let mut url = self.endpoint("categories")?;
        url.query_pairs_mut().append_pair("tree", "true");
        let body: serde_json::Value = self
            .send_json(self.request(Method::GET, url), "Không thể tải danh mục")
            .await?;
        let tree: Vec<Category> = extract_list(body, &["data"])?;

        self.cache_insert(cache_key.to_string(), CacheValue::Categories(tree.clone()))
            .await;
        Ok(tree)
    }
}
