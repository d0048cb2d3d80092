//! Client-side wishlist.
//!
//! Not synchronized with the account's server-side favorites.

use std::collections::HashSet;

use pocketshop_core::{Product, ProductId};
use tokio::sync::watch;

/// Wishlisted product snapshots in insertion order, with an id index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WishlistState {
    items: Vec<Product>,
    ids: HashSet<ProductId>,
}

impl WishlistState {
    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn wishlist_count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add or remove `product`; returns whether it is now present.
    fn toggle(&mut self, product: &Product) -> bool {
        if self.ids.remove(&product.id) {
            self.items.retain(|item| item.id != product.id);
            false
        } else {
            self.ids.insert(product.id.clone());
            self.items.push(product.clone());
            true
        }
    }
}

/// Wishlist store handle.
#[derive(Debug)]
pub struct WishlistStore {
    state: watch::Sender<WishlistState>,
}

impl Default for WishlistStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WishlistStore {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(WishlistState::default());
        Self { state }
    }

    #[must_use]
    pub fn snapshot(&self) -> WishlistState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WishlistState> {
        self.state.subscribe()
    }

    /// Add `product` if absent, remove it if present.
    ///
    /// Returns `true` when the product is in the wishlist afterwards.
    pub fn toggle_wishlist(&self, product: &Product) -> bool {
        let mut present = false;
        self.state.send_modify(|state| present = state.toggle(product));
        tracing::debug!(product_id = %product.id, present, "Toggled wishlist");
        present
    }

    #[must_use]
    pub fn is_in_wishlist(&self, id: &ProductId) -> bool {
        self.state.borrow().contains(id)
    }

    #[must_use]
    pub fn wishlist_count(&self) -> usize {
        self.state.borrow().wishlist_count()
    }

    pub fn clear_wishlist(&self) {
        self.state.send_if_modified(|state| {
            if state.is_empty() {
                return false;
            }
            *state = WishlistState::default();
            true
        });
    }
}
