//! Shopping cart.
//!
//! Purely local: no network calls, nothing persisted. Lines are keyed by
//! product and variant, so the same product in two sizes is two lines.

use pocketshop_core::{CartItem, CartLineKey, Price, Product, ProductId};
use tokio::sync::watch;

use crate::telemetry::add_breadcrumb;

/// Cart contents in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    pub items: Vec<CartItem>,
}

impl CartState {
    /// Total units across all lines, saturating at `u32::MAX`.
    #[must_use]
    pub fn cart_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count: u32, item| count.saturating_add(item.quantity))
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Quantity held on the line for `key`, 0 if absent.
    #[must_use]
    pub fn quantity_of(&self, key: &CartLineKey) -> u32 {
        self.items
            .iter()
            .find(|item| item.matches(key))
            .map_or(0, |item| item.quantity)
    }

    /// Whether any variant of the product is in the cart.
    #[must_use]
    pub fn contains_product(&self, id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart store handle.
#[derive(Debug)]
pub struct CartStore {
    state: watch::Sender<CartState>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(CartState::default());
        Self { state }
    }

    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn cart_count(&self) -> u32 {
        self.state.borrow().cart_count()
    }

    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.state.borrow().cart_total()
    }

    /// Add `quantity` units of a product variant.
    ///
    /// Merges into an existing line with the same key, otherwise appends a
    /// new line holding a snapshot of `product`. A zero quantity is ignored.
    pub fn add_to_cart(
        &self,
        product: &Product,
        quantity: u32,
        color: Option<String>,
        size: Option<String>,
    ) {
        if quantity == 0 {
            tracing::debug!(product_id = %product.id, "Ignoring zero-quantity add");
            return;
        }

        let key = CartLineKey::variant(product.id.clone(), color, size);
        self.state.send_modify(|state| {
            if let Some(item) = state.items.iter_mut().find(|item| item.matches(&key)) {
                item.quantity = item.quantity.saturating_add(quantity);
            } else {
                state.items.push(CartItem {
                    product: product.clone(),
                    quantity,
                    color: key.color.clone(),
                    size: key.size.clone(),
                });
            }
        });

        tracing::debug!(product_id = %product.id, quantity, "Added to cart");
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("product_id", product.id.as_str()), ("title", product.title.as_str())]),
        );
    }

    /// Set a line's quantity directly. Zero or negative removes the line.
    pub fn update_quantity(&self, key: &CartLineKey, quantity: i64) {
        let changed = self.state.send_if_modified(|state| {
            let Some(index) = state.items.iter().position(|item| item.matches(key)) else {
                return false;
            };
            if quantity <= 0 {
                state.items.remove(index);
            } else if let Some(item) = state.items.get_mut(index) {
                item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            }
            true
        });

        if changed {
            tracing::debug!(product_id = %key.product_id, quantity, "Updated cart quantity");
        }
    }

    /// Remove a line. `label` is used for logging only.
    pub fn remove_from_cart(&self, key: &CartLineKey, label: &str) {
        let removed = self.state.send_if_modified(|state| {
            let before = state.items.len();
            state.items.retain(|item| !item.matches(key));
            state.items.len() != before
        });

        if removed {
            tracing::debug!(product_id = %key.product_id, label, "Removed from cart");
            add_breadcrumb(
                "cart",
                "Removed from cart",
                Some(&[("product_id", key.product_id.as_str()), ("title", label)]),
            );
        }
    }

    pub fn clear_cart(&self) {
        self.state.send_if_modified(|state| {
            if state.items.is_empty() {
                return false;
            }
            state.items.clear();
            true
        });
        add_breadcrumb("cart", "Cleared cart", None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_product;

    fn variant(id: &str, color: Option<&str>, size: Option<&str>) -> CartLineKey {
        CartLineKey::variant(
            ProductId::new(id),
            color.map(str::to_string),
            size.map(str::to_string),
        )
    }

    #[test]
    fn test_add_merges_same_variant() {
        let cart = CartStore::new();
        let product = sample_product("p1", 1000);

        cart.add_to_cart(&product, 1, Some("red".into()), Some("M".into()));
        cart.add_to_cart(&product, 2, Some("red".into()), Some("M".into()));

        let state = cart.snapshot();
        assert_eq!(state.line_count(), 1);
        assert_eq!(state.quantity_of(&variant("p1", Some("red"), Some("M"))), 3);
    }

    #[test]
    fn test_different_variants_are_separate_lines() {
        let cart = CartStore::new();
        let product = sample_product("p1", 1000);

        cart.add_to_cart(&product, 1, Some("red".into()), Some("M".into()));
        cart.add_to_cart(&product, 1, Some("red".into()), Some("L".into()));
        cart.add_to_cart(&product, 1, None, None);

        let state = cart.snapshot();
        assert_eq!(state.line_count(), 3);
        assert_eq!(state.cart_count(), 3);
        assert!(state.contains_product(&ProductId::new("p1")));
    }

    #[test]
    fn test_zero_quantity_add_is_ignored() {
        let cart = CartStore::new();
        cart.add_to_cart(&sample_product("p1", 1000), 0, None, None);
        assert!(cart.snapshot().is_empty());
    }

    #[test]
    fn test_totals() {
        let cart = CartStore::new();
        cart.add_to_cart(&sample_product("p1", 1000), 2, None, None);
        cart.add_to_cart(&sample_product("p2", 500), 1, None, None);

        assert_eq!(cart.cart_count(), 3);
        assert_eq!(cart.cart_total(), Price::from(25));
    }

    #[test]
    fn test_count_saturates_across_lines() {
        let cart = CartStore::new();
        let product = sample_product("p1", 100);
        cart.add_to_cart(&product, u32::MAX, Some("red".to_string()), None);
        cart.add_to_cart(&product, 1, Some("blue".to_string()), None);

        assert_eq!(cart.snapshot().line_count(), 2);
        assert_eq!(cart.cart_count(), u32::MAX);
    }

    #[test]
    fn test_update_quantity_sets_directly() {
        let cart = CartStore::new();
        cart.add_to_cart(&sample_product("p1", 1000), 2, None, None);

        let key = variant("p1", None, None);
        cart.update_quantity(&key, 5);
        assert_eq!(cart.snapshot().quantity_of(&key), 5);
    }

    #[test]
    fn test_update_quantity_to_zero_or_below_removes() {
        let cart = CartStore::new();
        cart.add_to_cart(&sample_product("p1", 1000), 2, None, None);
        cart.add_to_cart(&sample_product("p2", 1000), 2, None, None);

        cart.update_quantity(&variant("p1", None, None), 0);
        cart.update_quantity(&variant("p2", None, None), -3);
        assert!(cart.snapshot().is_empty());
    }

    #[test]
    fn test_update_unknown_line_is_noop() {
        let cart = CartStore::new();
        let rx = cart.subscribe();
        cart.update_quantity(&variant("missing", None, None), 4);
        assert!(!rx.has_changed().unwrap_or(true));
    }

    #[test]
    fn test_remove_and_clear() {
        let cart = CartStore::new();
        cart.add_to_cart(&sample_product("p1", 1000), 1, Some("red".into()), None);
        cart.add_to_cart(&sample_product("p2", 1000), 1, None, None);

        cart.remove_from_cart(&variant("p1", Some("red"), None), "Runner");
        let state = cart.snapshot();
        assert_eq!(state.line_count(), 1);
        assert!(!state.contains_product(&ProductId::new("p1")));

        cart.clear_cart();
        assert!(cart.snapshot().is_empty());
        assert_eq!(cart.cart_total(), Price::ZERO);
    }

    #[test]
    fn test_cart_keeps_product_snapshot() {
        let cart = CartStore::new();
        let mut product = sample_product("p1", 1000);
        cart.add_to_cart(&product, 1, None, None);

        product.price = Price::from(99);
        cart.add_to_cart(&product, 1, None, None);

        assert_eq!(cart.cart_total(), Price::from(20));
    }

    #[test]
    fn test_subscribers_observe_mutations() {
        let cart = CartStore::new();
        let mut rx = cart.subscribe();
        cart.add_to_cart(&sample_product("p1", 1000), 1, None, None);
        assert!(rx.has_changed().unwrap_or(false));
        assert_eq!(rx.borrow_and_update().cart_count(), 1);
    }
}
