//! Storefront state shared by front ends.

use std::sync::Arc;

use crate::api::{ApiClient, User};
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::services::addresses::AddressBook;
use crate::services::auth::AuthService;
use crate::services::cart::CartStore;
use crate::services::catalog::{Catalog, ProductListing};
use crate::services::checkout::CheckoutService;
use crate::services::content::ContentService;
use crate::services::notifications::NotificationCenter;
use crate::services::order_watcher::{self, WatcherHandle};
use crate::services::orders::OrderStore;
use crate::services::profile::ProfileService;
use crate::services::wishlist::WishlistStore;
use crate::session::{FileSessionStore, SessionStore};

/// All stores over one API client and one session.
///
/// This struct is cheaply cloneable via `Arc`; clones share every store.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    api: ApiClient,
    auth: AuthService,
    cart: CartStore,
    wishlist: WishlistStore,
    addresses: AddressBook,
    orders: OrderStore,
    checkout: CheckoutService,
    catalog: Catalog,
    profile: ProfileService,
    content: ContentService,
    notifications: NotificationCenter,
}

impl Storefront {
    /// Build the stores with a file-backed session and notification list
    /// under `config.session_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or a saved file
    /// cannot be read.
    pub fn open(config: StorefrontConfig) -> Result<Self> {
        let sessions: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(config.session_file()));
        let notifications = NotificationCenter::open(config.notifications_file())?;
        Self::new(config, sessions, notifications)
    }

    /// Build the stores over the given session store.
    ///
    /// A saved session is restored so the client starts authenticated.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the session
    /// cannot be read.
    pub fn new(
        config: StorefrontConfig,
        sessions: Arc<dyn SessionStore>,
        notifications: NotificationCenter,
    ) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        let auth = AuthService::new(api.clone(), Arc::clone(&sessions));
        auth.restore()?;

        let cart = CartStore::new(api.clone(), sessions, config.quantity_bounds);
        let orders = OrderStore::new(api.clone());
        let checkout = CheckoutService::new(
            api.clone(),
            cart.clone(),
            orders.clone(),
            config.checkout.clone(),
        );

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                wishlist: WishlistStore::new(api.clone()),
                addresses: AddressBook::new(api.clone()),
                catalog: Catalog::new(api.clone()),
                profile: ProfileService::new(api.clone()),
                content: ContentService::new(api.clone()),
                config,
                api,
                auth,
                cart,
                orders,
                checkout,
                notifications,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn wishlist(&self) -> &WishlistStore {
        &self.inner.wishlist
    }

    #[must_use]
    pub fn addresses(&self) -> &AddressBook {
        &self.inner.addresses
    }

    #[must_use]
    pub fn orders(&self) -> &OrderStore {
        &self.inner.orders
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn profile(&self) -> &ProfileService {
        &self.inner.profile
    }

    #[must_use]
    pub fn content(&self) -> &ContentService {
        &self.inner.content
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationCenter {
        &self.inner.notifications
    }

    /// A product listing bound to this client.
    #[must_use]
    pub fn product_listing(&self) -> ProductListing {
        ProductListing::new(self.inner.api.clone())
    }

    /// The logged-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the saved session cannot be read.
    pub fn current_user(&self) -> Result<Option<User>> {
        Ok(self.inner.auth.current_user()?)
    }

    /// Log out and drop every store's local state.
    ///
    /// # Errors
    ///
    /// Returns an error if the saved session cannot be removed.
    pub async fn logout(&self) -> Result<()> {
        self.inner.auth.logout()?;
        self.inner.cart.reset().await;
        self.inner.wishlist.reset().await;
        self.inner.orders.reset().await;
        Ok(())
    }

    /// Start polling order statuses into the notification center.
    #[must_use]
    pub fn start_order_watcher(&self) -> WatcherHandle {
        order_watcher::spawn(
            self.inner.api.clone(),
            Arc::new(self.inner.notifications.clone()),
            self.inner.config.order_poll_interval,
        )
    }
}
