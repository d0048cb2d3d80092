//! The storefront container.
//!
//! One [`Storefront`] is created at the application root and handed to every
//! screen. It owns the API client and one instance of each store; clones
//! share them.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::ClientConfig;
use crate::session::AuthSession;
use crate::storage::{FileStore, KeyValueStore, StorageError};
use crate::stores::{AuthStore, CartStore, CatalogStore, WishlistStore};

/// Application state shared by all screens.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: ClientConfig,
    api: ApiClient,
    auth: AuthStore,
    catalog: CatalogStore,
    cart: CartStore,
    wishlist: WishlistStore,
}

impl Storefront {
    /// Build the stores on top of `storage`.
    ///
    /// Call [`Storefront::start`] afterwards to restore the persisted
    /// session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let session = Arc::new(AuthSession::new(storage, config.storage_key.clone()));
        let api = ApiClient::new(&config, session)?;

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                auth: AuthStore::new(api.clone()),
                catalog: CatalogStore::new(api.clone(), config.page_limit),
                cart: CartStore::new(),
                wishlist: WishlistStore::new(),
                api,
                config,
            }),
        })
    }

    /// Build the stores on a [`FileStore`] in the configured directory.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn with_file_storage(config: ClientConfig) -> Result<Self, ApiError> {
        let storage = Arc::new(FileStore::new(config.storage_dir.clone()));
        Self::new(config, storage)
    }

    /// Restore the persisted session. Returns whether a user was restored.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the snapshot cannot be read.
    pub async fn start(&self) -> Result<bool, StorageError> {
        self.inner.auth.hydrate().await
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn auth(&self) -> &AuthStore {
        &self.inner.auth
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn wishlist(&self) -> &WishlistStore {
        &self.inner.wishlist
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("api", &self.inner.api)
            .finish_non_exhaustive()
    }
}
