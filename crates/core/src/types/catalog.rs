//! Read-only catalog reference data: categories and promotional banners.

use serde::{Deserialize, Serialize};

use super::id::{BannerId, CategoryId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category document id.
    #[serde(rename = "_id", alias = "id")]
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// URL slug, also usable as a listing filter.
    #[serde(default)]
    pub slug: String,
    /// Icon name or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Cover image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A promotional slide for the home carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(rename = "_id", alias = "id")]
    pub id: BannerId,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Image URL.
    pub image: String,
    /// In-app deep link opened by the call to action.
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub button_text: String,
}

impl Banner {
    /// Id of the built-in banner.
    pub const FALLBACK_ID: &'static str = "default-banner";

    /// The built-in slide shown when the server has no banners.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            id: BannerId::new(Self::FALLBACK_ID),
            title: "New Season Arrivals".to_string(),
            subtitle: "Discover the latest styles".to_string(),
            image: "https://images.unsplash.com/photo-1441986300917-64674bd600d8".to_string(),
            link: "/products".to_string(),
            button_text: "Shop Now".to_string(),
        }
    }

    /// Whether this is the built-in banner.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.id.as_str() == Self::FALLBACK_ID
    }
}
