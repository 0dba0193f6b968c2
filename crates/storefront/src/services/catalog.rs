//! Catalog browsing: product listings, categories, variants and reviews.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use fruity_core::ProductId;

use crate::api::{
    ApiClient, Category, Product, ProductFilters, ProductPage, ProductSort, Review, Variant,
    find_category,
};
use crate::error::{AppError, Result};

/// Products shown on the home page sections.
pub const HOME_SECTION_LIMIT: u32 = 8;

/// Related products shown on a product page.
pub const RELATED_LIMIT: u32 = 4;

/// Published state of a [`ProductListing`].
#[derive(Debug, Clone, Default)]
pub enum ListingState {
    #[default]
    Idle,
    Loading(ProductFilters),
    Loaded {
        filters: ProductFilters,
        page: ProductPage,
    },
    Failed {
        filters: ProductFilters,
        error: Arc<AppError>,
    },
}

/// Product listing that follows the current filters.
///
/// Changing filters aborts the fetch still in flight, so only the result
/// for the latest filters is ever published.
pub struct ProductListing {
    api: ApiClient,
    tx: watch::Sender<ListingState>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl ProductListing {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let (tx, _) = watch::channel(ListingState::Idle);
        Self {
            api,
            tx,
            in_flight: Mutex::new(None),
        }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ListingState> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> ListingState {
        self.tx.borrow().clone()
    }

    /// Start fetching for `filters`, cancelling any previous fetch.
    pub fn set_filters(&self, filters: ProductFilters) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = in_flight.take() {
            if !previous.is_finished() {
                debug!("Cancelling superseded product fetch");
            }
            previous.abort();
        }

        self.tx.send_replace(ListingState::Loading(filters.clone()));

        let api = self.api.clone();
        let tx = self.tx.clone();
        *in_flight = Some(tokio::spawn(async move {
            let requested = filters.clone();
            let state = match api.list_products(&filters).await {
                Ok(page) => ListingState::Loaded { filters, page },
                Err(e) => ListingState::Failed {
                    error: Arc::new(e.into()),
                    filters,
                },
            };
            // Only the fetch for the current filters may publish
            tx.send_if_modified(|current| {
                if !matches!(current, ListingState::Loading(f) if *f == requested) {
                    debug!("Dropping stale product page");
                    return false;
                }
                *current = state;
                true
            });
        }));
    }

    /// Wait until the current fetch publishes a result.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Shared` wrapping the fetch error if the fetch
    /// failed, or `AppError::Internal` if the listing was dropped.
    pub async fn wait_loaded(&self) -> Result<ProductPage> {
        let mut rx = self.subscribe();
        loop {
            {
                let state = rx.borrow_and_update();
                match &*state {
                    ListingState::Loaded { page, .. } => return Ok(page.clone()),
                    ListingState::Failed { error, .. } => {
                        return Err(AppError::Shared(Arc::clone(error)));
                    }
                    ListingState::Idle | ListingState::Loading(_) => {}
                }
            }
            rx.changed()
                .await
                .map_err(|_| AppError::Internal("product listing closed".to_string()))?;
        }
    }
}

impl Drop for ProductListing {
    fn drop(&mut self) {
        if let Some(task) = self
            .in_flight
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

/// Read-only catalog queries.
#[derive(Clone)]
pub struct Catalog {
    api: ApiClient,
}

impl Catalog {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns an API error if the request fails.
    pub async fn products(&self, filters: &ProductFilters) -> Result<ProductPage> {
        Ok(self.api.list_products(filters).await?)
    }

    /// Featured products for the home page.
    ///
    /// # Errors
    ///
    /// Returns an API error if the request fails.
    pub async fn featured(&self) -> Result<Vec<Product>> {
        let filters = ProductFilters {
            featured: true,
            limit: Some(HOME_SECTION_LIMIT),
            ..ProductFilters::default()
        };
        Ok(self.api.list_products(&filters).await?.data)
    }

    /// Newest products for the home page.
    ///
    /// # Errors
    ///
    /// Returns an API error if the request fails.
    pub async fn newest(&self) -> Result<Vec<Product>> {
        let filters = ProductFilters {
            sort: Some(ProductSort::Latest),
            limit: Some(HOME_SECTION_LIMIT),
            ..ProductFilters::default()
        };
        Ok(self.api.list_products(&filters).await?.data)
    }

    /// Find a product by slug.
    ///
    /// The backend has no slug lookup, so this searches by the slug's words
    /// and matches the slug exactly.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no product has that slug.
    #[instrument(skip(self))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Product> {
        let filters = ProductFilters {
            search: Some(slug.replace('-', " ")),
            limit: Some(50),
            ..ProductFilters::default()
        };
        self.api
            .list_products(&filters)
            .await?
            .data
            .into_iter()
            .find(|p| p.slug == slug)
            .ok_or_else(|| AppError::NotFound(format!("Không tìm thấy sản phẩm: {slug}")))
    }

    /// Other products from the category named by `category_slug`.
    ///
    /// # Errors
    ///
    /// Returns an API error if a request fails. An unknown slug yields an
    /// empty list.
    #[instrument(skip(self))]
    pub async fn related(&self, category_slug: &str, exclude: ProductId) -> Result<Vec<Product>> {
        let tree = self.api.get_categories().await?;
        let Some(category) = find_category(&tree, category_slug) else {
            debug!("Related products: unknown category");
            return Ok(Vec::new());
        };

        let filters = ProductFilters {
            category_id: Some(category.id),
            limit: Some(RELATED_LIMIT + 1),
            ..ProductFilters::default()
        };
        Ok(self
            .api
            .list_products(&filters)
            .await?
            .data
            .into_iter()
            .filter(|p| p.id != exclude)
            .take(RELATED_LIMIT as usize)
            .collect())
    }

    /// # Errors
    ///
    /// Returns an API error if the request fails.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.api.get_categories().await?)
    }

    /// # Errors
    ///
    /// Returns an API error if the request fails.
    pub async fn variants(&self, product_id: ProductId) -> Result<Vec<Variant>> {
        Ok(self.api.get_product_variants(product_id).await?)
    }

    /// # Errors
    ///
    /// Returns an API error if the request fails.
    pub async fn reviews(&self, product_id: ProductId) -> Result<Vec<Review>> {
        Ok(self.api.get_product_reviews(product_id).await?)
    }
}
