//! Product catalog: the paged listing, the detail slot, and cached
//! reference data (popular products, categories, banners).
//!
//! Failures never clear data that is already loaded. Listing and detail
//! failures are recorded in `error`; reference-data failures are only
//! logged.

use pocketshop_core::{Banner, Category, Product, ProductFilters, ProductFiltersPatch, ProductId};
use tokio::sync::watch;
use tracing::instrument;

use crate::api::types::ProductListResponse;
use crate::api::{ApiClient, ApiError, endpoints};
use crate::error::StoreError;

const PRODUCTS_FALLBACK: &str = "Failed to load products. Please try again.";
const PRODUCT_FALLBACK: &str = "Failed to load product. Please try again.";

/// Observable catalog state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogState {
    /// The listing, pages appended in order.
    pub products: Vec<Product>,
    pub popular_products: Vec<Product>,
    pub categories: Vec<Category>,
    /// Never empty.
    pub banners: Vec<Banner>,
    /// Detail slot, independent of the listing.
    pub product: Option<Product>,
    pub filters: ProductFilters,
    /// Last page appended to `products`.
    pub current_page: u32,
    pub total_count: u64,
    pub total_pages: u32,
    pub has_more: bool,
    pub is_loading: bool,
    pub is_loading_more: bool,
    pub is_loading_product: bool,
    pub error: Option<String>,
    /// Bumped whenever the listing is replaced, so a late page from a
    /// previous listing is not appended to the new one.
    listing: u64,
}

impl CatalogState {
    fn new(page_limit: u32) -> Self {
        Self {
            products: Vec::new(),
            popular_products: Vec::new(),
            categories: Vec::new(),
            banners: vec![Banner::fallback()],
            product: None,
            filters: ProductFilters::defaults(page_limit),
            current_page: 1,
            total_count: 0,
            total_pages: 0,
            has_more: false,
            is_loading: false,
            is_loading_more: false,
            is_loading_product: false,
            error: None,
            listing: 0,
        }
    }

    fn apply_stats(&mut self, response: &ProductListResponse) {
        self.total_count = response.stats.total;
        self.total_pages = response.stats.page_count();
        self.has_more = self.total_pages > self.current_page;
    }
}

/// Catalog store handle.
#[derive(Debug)]
pub struct CatalogStore {
    api: ApiClient,
    page_limit: u32,
    state: watch::Sender<CatalogState>,
}

impl CatalogStore {
    #[must_use]
    pub fn new(api: ApiClient, page_limit: u32) -> Self {
        let (state, _) = watch::channel(CatalogState::new(page_limit));
        Self {
            api,
            page_limit,
            state,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    /// Load the first page of the listing, replacing the current list.
    ///
    /// With `reset_filters` the filter set is first restored to the
    /// defaults. The request always starts from page 1.
    ///
    /// # Errors
    ///
    /// Returns the request error after recording it in `error`.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self, reset_filters: bool) -> Result<(), StoreError> {
        let mut request = None;
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
            if reset_filters {
                state.filters = ProductFilters::defaults(self.page_limit);
            }
            state.listing = state.listing.wrapping_add(1);
            request = Some((state.filters.for_page(1), state.listing));
        });
        let Some((filters, listing)) = request else {
            return Ok(());
        };

        let result = self.fetch_listing(&filters).await;
        self.state.send_modify(|state| match &result {
            Ok(response) => {
                // Last response wins; only the newest request clears the flag
                if state.listing == listing {
                    state.is_loading = false;
                }
                state.products.clone_from(&response.products);
                // The cursor moves only on success
                state.filters.page = 1;
                state.current_page = 1;
                state.apply_stats(response);
            }
            Err(e) => {
                if state.listing == listing {
                    state.is_loading = false;
                }
                state.error = Some(e.user_message(PRODUCTS_FALLBACK));
            }
        });

        match result {
            Ok(response) => {
                tracing::debug!(
                    count = response.products.len(),
                    total = response.stats.total,
                    "Loaded product listing"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load product listing");
                Err(e.into())
            }
        }
    }

    /// Append the next listing page.
    ///
    /// Returns whether a page was appended: `Ok(false)` without a request
    /// when a page is already loading, when there are no more pages, or
    /// when the next page was already appended, and also when the listing
    /// was replaced while the page was in flight.
    ///
    /// # Errors
    ///
    /// Returns the request error after recording it in `error`.
    #[instrument(skip(self))]
    pub async fn fetch_more_products(&self) -> Result<bool, StoreError> {
        let mut request = None;
        self.state.send_if_modified(|state| {
            if state.is_loading_more || !state.has_more {
                return false;
            }
            let next_page = state.filters.page.saturating_add(1);
            if next_page <= state.current_page {
                return false;
            }
            state.is_loading_more = true;
            state.error = None;
            request = Some((state.filters.for_page(next_page), state.listing));
            true
        });
        let Some((filters, listing)) = request else {
            tracing::debug!("Skipping load-more");
            return Ok(false);
        };

        let next_page = filters.page;
        let result = self.fetch_listing(&filters).await;
        let mut appended = false;
        self.state.send_modify(|state| {
            state.is_loading_more = false;
            match &result {
                Ok(response) if state.listing == listing => {
                    state.products.extend(response.products.iter().cloned());
                    state.filters.page = next_page;
                    state.current_page = next_page;
                    state.apply_stats(response);
                    appended = true;
                }
                Ok(_) => {
                    tracing::debug!(page = next_page, "Dropping page from a replaced listing");
                }
                Err(e) => state.error = Some(e.user_message(PRODUCTS_FALLBACK)),
            }
        });

        match result {
            Ok(_) => Ok(appended),
            Err(e) => {
                tracing::warn!(error = %e, page = next_page, "Failed to load more products");
                Err(e.into())
            }
        }
    }

    /// Merge `patch` into the filter set. Does not fetch.
    pub fn set_filters(&self, patch: ProductFiltersPatch) {
        self.state.send_modify(|state| patch.apply_to(&mut state.filters));
    }

    /// Restore the default filter set. Does not fetch.
    pub fn reset_filters(&self) {
        self.state
            .send_modify(|state| state.filters = ProductFilters::defaults(self.page_limit));
    }

    /// Load one product into the detail slot.
    ///
    /// # Errors
    ///
    /// Returns the request error after recording it in `error`.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn fetch_product_by_id(&self, id: &ProductId) -> Result<Product, StoreError> {
        self.state.send_modify(|state| {
            state.is_loading_product = true;
            state.error = None;
        });

        let result: Result<Product, ApiError> =
            self.api.get(&endpoints::product_by_id(id.as_str()), &[]).await;

        self.state.send_modify(|state| {
            state.is_loading_product = false;
            match &result {
                Ok(product) => state.product = Some(product.clone()),
                Err(e) => state.error = Some(e.user_message(PRODUCT_FALLBACK)),
            }
        });

        result.map_err(|e| {
            tracing::warn!(error = %e, "Failed to load product");
            e.into()
        })
    }

    /// Refresh the popular products cache. Failures keep the cached list.
    #[instrument(skip(self))]
    pub async fn fetch_popular_products(&self) {
        match self.api.get::<Vec<Product>>(endpoints::POPULAR_PRODUCTS, &[]).await {
            Ok(products) => self
                .state
                .send_modify(|state| state.popular_products = products),
            Err(e) => tracing::warn!(error = %e, "Failed to load popular products"),
        }
    }

    /// Refresh the categories cache. Failures keep the cached list.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) {
        match self.api.get::<Vec<Category>>(endpoints::CATEGORIES, &[]).await {
            Ok(categories) => self.state.send_modify(|state| state.categories = categories),
            Err(e) => tracing::warn!(error = %e, "Failed to load categories"),
        }
    }

    /// Refresh the banner carousel.
    ///
    /// An empty response installs the built-in banner. Failures keep the
    /// current banners.
    #[instrument(skip(self))]
    pub async fn fetch_banners(&self) {
        match self.api.get::<Vec<Banner>>(endpoints::BANNERS, &[]).await {
            Ok(banners) => {
                let banners = if banners.is_empty() {
                    vec![Banner::fallback()]
                } else {
                    banners
                };
                self.state.send_modify(|state| state.banners = banners);
            }
            Err(e) => tracing::warn!(error = %e, "Failed to load banners"),
        }
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    pub fn clear_product(&self) {
        self.state.send_if_modified(|state| state.product.take().is_some());
    }

    async fn fetch_listing(&self, filters: &ProductFilters) -> Result<ProductListResponse, ApiError> {
        self.api
            .get(endpoints::PRODUCT_QUERY, &filters.to_query_pairs())
            .await
    }
}
