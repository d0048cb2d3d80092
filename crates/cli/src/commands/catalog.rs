//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! pocketshop products --search linen --sort price-desc --pages 3
//! pocketshop product 64f1c2
//! pocketshop categories
//! ```

use pocketshop_client::Storefront;
use pocketshop_core::{ProductFiltersPatch, ProductId, ProductSort};

use crate::error::CliError;
use crate::output::{self, Format};

/// Listing filters taken from the command line.
#[derive(Debug, Default)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<ProductSort>,
    pub pages: u32,
}

impl ListingQuery {
    fn patch(&self) -> ProductFiltersPatch {
        let mut patch = ProductFiltersPatch::default();
        if let Some(category) = &self.category {
            patch = patch.category(category.clone());
        }
        if let Some(search) = &self.search {
            patch = patch.search(search.clone());
        }
        if let Some(sort) = self.sort {
            patch = patch.sort(sort);
        }
        patch
    }
}

/// Load up to `query.pages` listing pages and print the result.
pub async fn products(
    storefront: &Storefront,
    query: ListingQuery,
    format: Format,
) -> Result<(), CliError> {
    let catalog = storefront.catalog();
    catalog.set_filters(query.patch());
    catalog.fetch_products(false).await?;

    for _ in 1..query.pages {
        if !catalog.fetch_more_products().await? {
            break;
        }
    }

    let state = catalog.snapshot();
    match format {
        Format::Json => output::json(&state.products)?,
        Format::Table => output::listing(&state),
    }
    Ok(())
}

pub async fn product(storefront: &Storefront, id: &str, format: Format) -> Result<(), CliError> {
    let product = storefront
        .catalog()
        .fetch_product_by_id(&ProductId::new(id))
        .await?;
    match format {
        Format::Json => output::json(&product)?,
        Format::Table => output::product_detail(&product),
    }
    Ok(())
}

pub async fn popular(storefront: &Storefront, format: Format) -> Result<(), CliError> {
    storefront.catalog().fetch_popular_products().await;
    let products = storefront.catalog().snapshot().popular_products;
    match format {
        Format::Json => output::json(&products)?,
        Format::Table => products.iter().for_each(output::product_row),
    }
    Ok(())
}

pub async fn categories(storefront: &Storefront, format: Format) -> Result<(), CliError> {
    storefront.catalog().fetch_categories().await;
    let categories = storefront.catalog().snapshot().categories;
    match format {
        Format::Json => output::json(&categories)?,
        Format::Table => categories.iter().for_each(output::category),
    }
    Ok(())
}

pub async fn banners(storefront: &Storefront, format: Format) -> Result<(), CliError> {
    storefront.catalog().fetch_banners().await;
    let banners = storefront.catalog().snapshot().banners;
    match format {
        Format::Json => output::json(&banners)?,
        Format::Table => banners.iter().for_each(output::banner),
    }
    Ok(())
}
