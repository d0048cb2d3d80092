//! Cart line records.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// Identity of a cart line: the product plus the chosen variant.
///
/// Two additions of the same product in the same color and size merge into
/// one line; a different color or size is a separate line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartLineKey {
    pub product_id: ProductId,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl CartLineKey {
    /// Key for a product with no variant selection.
    #[must_use]
    pub const fn product(product_id: ProductId) -> Self {
        Self {
            product_id,
            color: None,
            size: None,
        }
    }

    /// Key for a specific variant.
    #[must_use]
    pub const fn variant(
        product_id: ProductId,
        color: Option<String>,
        size: Option<String>,
    ) -> Self {
        Self {
            product_id,
            color,
            size,
        }
    }
}

/// One cart line.
///
/// `product` is a snapshot taken when the line was created; the line keeps
/// that price until it is removed and added again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    /// Always at least 1.
    pub quantity: u32,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl CartItem {
    /// This line's key.
    #[must_use]
    pub fn key(&self) -> CartLineKey {
        CartLineKey::variant(
            self.product.id.clone(),
            self.color.clone(),
            self.size.clone(),
        )
    }

    /// Whether this line has the given key.
    #[must_use]
    pub fn matches(&self, key: &CartLineKey) -> bool {
        self.product.id == key.product_id && self.color == key.color && self.size == key.size
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.quantity
    }
}
