//! Wishlist state synchronized with the server.
//!
//! Concurrent toggles of the same product are not serialized; the last
//! refetch wins.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::instrument;

use fruity_core::ProductId;

use crate::api::{ApiClient, WishlistItem};
use crate::error::{AppError, Result, add_breadcrumb};

#[derive(Debug, Default)]
struct WishlistState {
    items: Vec<WishlistItem>,
    last_error: Option<String>,
}

/// Wishlist store. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct WishlistStore {
    api: ApiClient,
    state: Arc<RwLock<WishlistState>>,
}

impl WishlistStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(WishlistState::default())),
        }
    }

    pub async fn items(&self) -> Vec<WishlistItem> {
        self.state.read().await.items.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    /// Whether `product_id` is on the local list.
    pub async fn is_in_wishlist(&self, product_id: ProductId) -> bool {
        contains(&self.state.read().await.items, product_id)
    }

    /// Replace local state with the server wishlist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotAuthenticated` without a token, or an API error.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Vec<WishlistItem>> {
        if !self.api.has_token() {
            return self.fail(AppError::NotAuthenticated).await;
        }
        match self.api.get_wishlist().await {
            Ok(items) => {
                let mut state = self.state.write().await;
                state.items.clone_from(&items);
                state.last_error = None;
                Ok(items)
            }
            Err(e) => self.fail(e.into()).await,
        }
    }

    /// Add the product if absent, remove it if present.
    ///
    /// Returns whether the product is on the wishlist afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotAuthenticated` without a token, or an API error;
    /// local state is unchanged on failure.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn toggle(&self, product_id: ProductId) -> Result<bool> {
        if !self.api.has_token() {
            return self.fail(AppError::NotAuthenticated).await;
        }

        if self.is_in_wishlist(product_id).await {
            if let Err(e) = self.api.remove_from_wishlist(product_id).await {
                return self.fail(e.into()).await;
            }
            let mut state = self.state.write().await;
            state.items.retain(|i| i.product_id() != product_id);
            state.last_error = None;
            add_breadcrumb("wishlist", "Removed from wishlist", None);
            return Ok(false);
        }

        if let Err(e) = self.api.add_to_wishlist(product_id).await {
            return self.fail(e.into()).await;
        }
        add_breadcrumb("wishlist", "Added to wishlist", None);
        let items = self.load().await?;
        Ok(contains(&items, product_id))
    }

    /// Drop local state (logout).
    pub async fn reset(&self) {
        *self.state.write().await = WishlistState::default();
    }

    async fn fail<T>(&self, err: AppError) -> Result<T> {
        self.state.write().await.last_error = Some(err.user_message());
        Err(err)
    }
}

/// Ids compare numerically, so `"12"` and `12` from the backend match.
fn contains(items: &[WishlistItem], product_id: ProductId) -> bool {
    items.iter().any(|i| i.product_id() == product_id)
}
