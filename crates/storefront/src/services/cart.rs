//! Cart state synchronized with the server cart.
//!
//! The server is authoritative: every mutation is followed by a refetch
//! (or, for removals, by the equivalent local edit). Adding an item with
//! product details shows it locally right away; if the request then fails
//! the provisional line stays until the next fetch.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use fruity_core::{AddressId, CartItemId, ProductId, QuantityBounds, VariantId};

use crate::api::{ApiClient, CartItem, ProductInfo};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::session::SessionStore;

/// Snapshot of the local cart.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    pub items: Vec<CartItem>,
    /// Customer-facing text of the last failed operation.
    pub last_error: Option<String>,
}

impl CartState {
    /// `Σ quantity`.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// `Σ price × quantity`.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

/// Cart store. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    api: ApiClient,
    sessions: Arc<dyn SessionStore>,
    bounds: QuantityBounds,
    state: RwLock<CartState>,
}

impl CartStore {
    #[must_use]
    pub fn new(api: ApiClient, sessions: Arc<dyn SessionStore>, bounds: QuantityBounds) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                api,
                sessions,
                bounds,
                state: RwLock::new(CartState::default()),
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Copy of the current state.
    pub async fn snapshot(&self) -> CartState {
        self.inner.state.read().await.clone()
    }

    pub async fn items(&self) -> Vec<CartItem> {
        self.inner.state.read().await.items.clone()
    }

    pub async fn total_items(&self) -> u64 {
        self.inner.state.read().await.total_items()
    }

    pub async fn total_price(&self) -> Decimal {
        self.inner.state.read().await.total_price()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.inner.state.read().await.last_error.clone()
    }

    /// Quantity bounds applied to updates.
    #[must_use]
    pub fn bounds(&self) -> QuantityBounds {
        self.inner.bounds
    }

    // =========================================================================
    // Server Sync
    // =========================================================================

    /// Replace local state with the server cart.
    ///
    /// Without a token the local cart is emptied and nothing is fetched.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails; local state is kept.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Vec<CartItem>> {
        if !self.inner.api.has_token() {
            self.inner.state.write().await.items.clear();
            return Ok(Vec::new());
        }

        match self.inner.api.get_cart().await {
            Ok(items) => {
                debug!(lines = items.len(), "Cart fetched");
                let mut state = self.inner.state.write().await;
                state.items.clone_from(&items);
                state.last_error = None;
                Ok(items)
            }
            Err(e) => self.fail(e.into()).await,
        }
    }

    /// Add `quantity` of a product to the cart.
    ///
    /// Without `variant_id` the product's first variant is used. With
    /// `info` the line is shown locally before the server confirms it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `quantity` is not positive or the
    /// product has no variant, or an API error if a request fails.
    #[instrument(skip(self, info), fields(product_id = %product_id))]
    pub async fn add_item(
        &self,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        quantity: i64,
        info: Option<ProductInfo>,
    ) -> Result<Vec<CartItem>> {
        if !self.inner.api.has_token() {
            return Ok(self.items().await);
        }

        let quantity = match u32::try_from(quantity) {
            Ok(q) if q > 0 => q,
            _ => {
                return self
                    .fail(AppError::Validation("Số lượng phải lớn hơn 0.".to_string()))
                    .await;
            }
        };

        let variant_id = match variant_id {
            Some(id) => id,
            None => match self.resolve_first_variant(product_id).await {
                Ok(id) => id,
                Err(e) => return self.fail(e).await,
            },
        };

        if let Some(info) = info {
            let mut state = self.inner.state.write().await;
            merge_optimistic(&mut state.items, product_id, variant_id, quantity, info);
        }

        if let Err(e) = self.inner.api.add_cart_item(variant_id, quantity).await {
            return self.fail(e.into()).await;
        }

        let variant = variant_id.to_string();
        add_breadcrumb("cart", "Added to cart", Some(&[("variant_id", variant.as_str())]));
        self.fetch().await
    }

    /// Set a line's quantity, clamped into the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn update_quantity(&self, item_id: CartItemId, requested: i64) -> Result<Vec<CartItem>> {
        if !self.inner.api.has_token() {
            return Ok(self.items().await);
        }

        let quantity = self.inner.bounds.clamp(requested);
        if i64::from(quantity) != requested {
            debug!(requested, quantity, "Quantity clamped");
        }

        if let Err(e) = self.inner.api.update_cart_item(item_id, quantity).await {
            return self.fail(e.into()).await;
        }
        self.fetch().await
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails; the line stays locally.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn remove_item(&self, item_id: CartItemId) -> Result<Vec<CartItem>> {
        if !self.inner.api.has_token() {
            return Ok(self.items().await);
        }

        if let Err(e) = self.inner.api.remove_cart_item(item_id).await {
            return self.fail(e.into()).await;
        }

        let mut state = self.inner.state.write().await;
        state.items.retain(|i| i.id != item_id);
        state.last_error = None;
        add_breadcrumb("cart", "Removed from cart", None);
        Ok(state.items.clone())
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails; local lines are kept.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        if !self.inner.api.has_token() {
            return Ok(());
        }

        if let Err(e) = self.inner.api.clear_cart().await {
            return self.fail(e.into()).await;
        }

        let mut state = self.inner.state.write().await;
        state.items.clear();
        state.last_error = None;
        Ok(())
    }

    /// Drop local state without touching the server (logout).
    pub async fn reset(&self) {
        *self.inner.state.write().await = CartState::default();
    }

    // =========================================================================
    // Checkout Address
    // =========================================================================

    /// Address picked for checkout, persisted with the session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session cannot be read.
    pub fn selected_address_id(&self) -> Result<Option<AddressId>> {
        Ok(self.inner.sessions.load()?.selected_address_id)
    }

    /// Remember the address picked for checkout.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session cannot be written.
    pub fn set_selected_address_id(&self, id: Option<AddressId>) -> Result<()> {
        let mut session = self.inner.sessions.load()?;
        session.selected_address_id = id;
        self.inner.sessions.save(&session)?;
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn resolve_first_variant(&self, product_id: ProductId) -> Result<VariantId> {
        let variants = self.inner.api.get_product_variants(product_id).await?;
        variants.first().map(|v| v.id).ok_or_else(|| {
            warn!(%product_id, "Product has no variants");
            AppError::Validation("Sản phẩm không có variant hợp lệ.".to_string())
        })
    }

    async fn fail<T>(&self, err: AppError) -> Result<T> {
        self.inner.state.write().await.last_error = Some(err.user_message());
        Err(err)
    }
}

/// Show an add-to-cart locally: bump the matching product+variant line or
/// append a provisional one.
pub fn merge_optimistic(
    items: &mut Vec<CartItem>,
    product_id: ProductId,
    variant_id: VariantId,
    quantity: u32,
    info: ProductInfo,
) {
    if let Some(existing) = items
        .iter_mut()
        .find(|i| i.product_id == product_id && i.variant_id == Some(variant_id))
    {
        existing.quantity = existing.quantity.saturating_add(quantity);
        return;
    }

    items.push(CartItem {
        id: provisional_id(),
        product_id,
        variant_id: Some(variant_id),
        quantity,
        product: info,
        provisional: true,
    });
}

static NEXT_PROVISIONAL_ID: AtomicI64 = AtomicI64::new(-1);

/// Local-only line id; negative so it never collides with a server id.
fn provisional_id() -> CartItemId {
    CartItemId::new(NEXT_PROVISIONAL_ID.fetch_sub(1, Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i64, product: i64, variant: i64, quantity: u32, price: i64) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            product_id: ProductId::new(product),
            variant_id: Some(VariantId::new(variant)),
            quantity,
            product: ProductInfo {
                name: format!("P{product}"),
                price: Decimal::new(price, 0),
                images: Vec::new(),
                slug: String::new(),
            },
            provisional: false,
        }
    }

    #[test]
    fn test_totals() {
        let state = CartState {
            items: vec![line(1, 1, 11, 2, 30_000), line(2, 2, 21, 3, 15_500)],
            last_error: None,
        };
        assert_eq!(state.total_items(), 5);
        assert_eq!(state.total_price(), Decimal::new(106_500, 0));
        assert_eq!(CartState::default().total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_merge_bumps_existing_line() {
        let mut items = vec![line(1, 1, 11, 2, 30_000)];
        merge_optimistic(
            &mut items,
            ProductId::new(1),
            VariantId::new(11),
            3,
            ProductInfo::default(),
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
        assert!(!items[0].provisional);
    }

    #[test]
    fn test_merge_appends_provisional_line() {
        let mut items = vec![line(1, 1, 11, 2, 30_000)];
        let info = ProductInfo {
            name: "Bưởi da xanh".to_string(),
            price: Decimal::new(60_000, 0),
            images: vec!["buoi.jpg".to_string()],
            slug: "buoi-da-xanh".to_string(),
        };
        merge_optimistic(&mut items, ProductId::new(1), VariantId::new(12), 1, info);

        assert_eq!(items.len(), 2);
        let added = &items[1];
        assert!(added.provisional);
        assert!(added.id.as_i64() < 0);
        assert_eq!(added.variant_id, Some(VariantId::new(12)));
        assert_eq!(added.line_total(), Decimal::new(60_000, 0));
    }

    #[test]
    fn test_provisional_lines_get_distinct_ids() {
        let mut items = Vec::new();
        merge_optimistic(&mut items, ProductId::new(1), VariantId::new(11), 1, ProductInfo::default());
        merge_optimistic(&mut items, ProductId::new(1), VariantId::new(12), 1, ProductInfo::default());
        merge_optimistic(&mut items, ProductId::new(2), VariantId::new(21), 1, ProductInfo::default());

        assert_eq!(items.len(), 3);
        assert_ne!(items[0].id, items[1].id);
        assert_ne!(items[1].id, items[2].id);
        assert_ne!(items[0].id, items[2].id);
        assert!(items.iter().all(|i| i.id.as_i64() < 0));
    }
}
