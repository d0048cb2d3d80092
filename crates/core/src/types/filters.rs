//! Product listing filter descriptor.
//!
//! A [`ProductFilters`] value is the complete query sent to the listing
//! endpoint: filters, sort order and the pagination cursor. Screens batch
//! changes through a [`ProductFiltersPatch`] and issue one fetch afterwards.

use serde::{Deserialize, Serialize};

use super::price::Price;

/// Page size used when no other limit is configured.
pub const DEFAULT_PAGE_LIMIT: u32 = 8;

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    /// Best sellers first.
    #[default]
    Popular,
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    /// Highest rated first.
    Rating,
}

impl ProductSort {
    /// Query-string value understood by the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Rating => "rating",
        }
    }
}

impl std::fmt::Display for ProductSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" => Ok(Self::Popular),
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            "rating" => Ok(Self::Rating),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// Filter, sort and paging parameters for the product listing.
///
/// `page` is 1-based. `limit` is fixed for the lifetime of a catalog store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    /// Category id or slug.
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub sort: Option<ProductSort>,
    /// Free-text search.
    pub search: Option<String>,
    pub page: u32,
    pub limit: u32,
    pub only_published: Option<bool>,
    pub only_stock: Option<bool>,
    pub low_stocks: Option<bool>,
    pub high_stocks: Option<bool>,
    pub out_stocks: Option<bool>,
    pub high_sold: Option<bool>,
    pub low_sold: Option<bool>,
}

impl ProductFilters {
    /// The storefront defaults: first page, popular first, published and
    /// in-stock products only.
    #[must_use]
    pub fn defaults(limit: u32) -> Self {
        Self {
            category: None,
            brand: None,
            min_price: None,
            max_price: None,
            colors: Vec::new(),
            sizes: Vec::new(),
            sort: Some(ProductSort::Popular),
            search: None,
            page: 1,
            limit,
            only_published: Some(true),
            only_stock: Some(true),
            low_stocks: None,
            high_stocks: None,
            out_stocks: None,
            high_sold: None,
            low_sold: None,
        }
    }

    /// A copy of these filters pointing at `page`.
    #[must_use]
    pub fn for_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Render the listing query string pairs.
    ///
    /// Unset options are omitted, blank search text is omitted, list
    /// filters are comma-joined.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(brand) = &self.brand {
            pairs.push(("brand", brand.clone()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("minPrice", min.amount().to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice", max.amount().to_string()));
        }
        if !self.colors.is_empty() {
            pairs.push(("colors", self.colors.join(",")));
        }
        if !self.sizes.is_empty() {
            pairs.push(("sizes", self.sizes.join(",")));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_str().to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            pairs.push(("search", search.to_string()));
        }

        pairs.push(("page", self.page.to_string()));
        pairs.push(("limit", self.limit.to_string()));

        let flags = [
            ("onlyPublished", self.only_published),
            ("onlyStock", self.only_stock),
            ("lowStocks", self.low_stocks),
            ("highStocks", self.high_stocks),
            ("outStocks", self.out_stocks),
            ("highSold", self.high_sold),
            ("lowSold", self.low_sold),
        ];
        for (key, value) in flags {
            if let Some(value) = value {
                pairs.push((key, value.to_string()));
            }
        }

        pairs
    }
}

impl Default for ProductFilters {
    fn default() -> Self {
        Self::defaults(DEFAULT_PAGE_LIMIT)
    }
}

/// A shallow update to [`ProductFilters`].
///
/// `None` leaves a field untouched. Optional filters take `Some(None)` to
/// clear them. Paging is not patchable: the catalog store owns `page`, and
/// `limit` is fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFiltersPatch {
    pub category: Option<Option<String>>,
    pub brand: Option<Option<String>>,
    pub min_price: Option<Option<Price>>,
    pub max_price: Option<Option<Price>>,
    pub colors: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub sort: Option<Option<ProductSort>>,
    pub search: Option<Option<String>>,
    pub only_published: Option<Option<bool>>,
    pub only_stock: Option<Option<bool>>,
    pub low_stocks: Option<Option<bool>>,
    pub high_stocks: Option<Option<bool>>,
    pub out_stocks: Option<Option<bool>>,
    pub high_sold: Option<Option<bool>>,
    pub low_sold: Option<Option<bool>>,
}

impl ProductFiltersPatch {
    /// Filter by category id or slug.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(Some(category.into()));
        self
    }

    /// Set the search text.
    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(Some(text.into()));
        self
    }

    /// Set both price bounds; `None` clears a bound.
    #[must_use]
    pub const fn price_range(mut self, min: Option<Price>, max: Option<Price>) -> Self {
        self.min_price = Some(min);
        self.max_price = Some(max);
        self
    }

    #[must_use]
    pub const fn sort(mut self, sort: ProductSort) -> Self {
        self.sort = Some(Some(sort));
        self
    }

    /// Merge into `filters`, overwriting only the fields this patch sets.
    pub fn apply_to(self, filters: &mut ProductFilters) {
        fn merge<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        merge(&mut filters.category, self.category);
        merge(&mut filters.brand, self.brand);
        merge(&mut filters.min_price, self.min_price);
        merge(&mut filters.max_price, self.max_price);
        merge(&mut filters.colors, self.colors);
        merge(&mut filters.sizes, self.sizes);
        merge(&mut filters.sort, self.sort);
        merge(&mut filters.search, self.search);
        merge(&mut filters.only_published, self.only_published);
        merge(&mut filters.only_stock, self.only_stock);
        merge(&mut filters.low_stocks, self.low_stocks);
        merge(&mut filters.high_stocks, self.high_stocks);
        merge(&mut filters.out_stocks, self.out_stocks);
        merge(&mut filters.high_sold, self.high_sold);
        merge(&mut filters.low_sold, self.low_sold);
    }
}
