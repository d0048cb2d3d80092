//! Catalog product records.
//!
//! Products are owned by the catalog and immutable on the client: a product
//! only changes by whole-record replacement when it is fetched again. Cart
//! and wishlist entries hold their own snapshot copies.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::catalog::Category;
use super::id::{CategoryId, ProductId, UserId};
use super::price::Price;

/// How long after creation a product is badged as new.
pub const NEW_PRODUCT_WINDOW_DAYS: i64 = 30;

/// A catalog product as returned by the storefront API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product document id.
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
    /// URL slug.
    #[serde(default)]
    pub slug: String,
    /// Category, either populated or as a bare id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    /// Current selling price.
    pub price: Price,
    /// Reference price the product is discounted from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Price>,
    /// Units in stock.
    #[serde(default)]
    pub quantity: u32,
    /// Product images, primary first.
    #[serde(default)]
    pub images: Vec<ProductImage>,
    /// Brand name.
    #[serde(default)]
    pub brand: String,
    /// Units sold.
    #[serde(default)]
    pub sold: u32,
    /// Whether the product is visible in the storefront.
    #[serde(default)]
    pub is_published: bool,
    /// Available colors.
    #[serde(default)]
    pub colors: Vec<String>,
    /// Available sizes.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Customer ratings.
    #[serde(default)]
    pub ratings: Vec<ProductRating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Storage object name.
    #[serde(default)]
    pub name: String,
    /// Public image URL.
    pub url: String,
}

/// A single customer rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRating {
    /// Rating author.
    pub user: UserId,
    /// Stars, 1 to 5.
    pub rating: u8,
}

/// A product's category: populated by the API on some endpoints, a bare id
/// on others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    /// Fully populated category record.
    Expanded(Category),
    /// Category id only.
    Id(CategoryId),
}

impl CategoryRef {
    /// The category id, whichever form was received.
    #[must_use]
    pub const fn id(&self) -> &CategoryId {
        match self {
            Self::Expanded(category) => &category.id,
            Self::Id(id) => id,
        }
    }

    /// The category name, when populated.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Expanded(category) => Some(&category.name),
            Self::Id(_) => None,
        }
    }
}

impl Product {
    /// Whether the product was created within [`NEW_PRODUCT_WINDOW_DAYS`]
    /// of `now`.
    #[must_use]
    pub fn is_new(&self, now: DateTime<Utc>) -> bool {
        self.created_at.is_some_and(|created| {
            created <= now && now - created <= Duration::days(NEW_PRODUCT_WINDOW_DAYS)
        })
    }

    /// Whole-percent discount relative to `compare_at_price`.
    ///
    /// Zero when there is no reference price or it is not above the
    /// selling price.
    #[must_use]
    pub fn discount_percentage(&self) -> u8 {
        let Some(reference) = self.compare_at_price else {
            return 0;
        };
        if reference.is_zero() || reference <= self.price {
            return 0;
        }

        let ratio = (reference.amount() - self.price.amount()) / reference.amount();
        (ratio * Decimal::ONE_HUNDRED).round().to_u8().unwrap_or(100)
    }

    /// Mean star rating, 0.0 when unrated.
    #[must_use]
    pub fn average_rating(&self) -> f64 {
        if self.ratings.is_empty() {
            return 0.0;
        }
        let total: u32 = self.ratings.iter().map(|r| u32::from(r.rating)).sum();
        #[allow(clippy::cast_precision_loss)] // rating counts never approach f64 precision
        let count = self.ratings.len() as f64;
        f64::from(total) / count
    }

    /// Whether any units are in stock.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// URL of the first image.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }
}
