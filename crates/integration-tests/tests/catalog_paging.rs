//! Infinite-scroll listing behavior against a paged API.

#![allow(clippy::unwrap_used)]

use httpmock::Method::GET;
use pocketshop_core::{ProductFiltersPatch, ProductSort};
use pocketshop_integration_tests::{TestContext, listing_page};

#[tokio::test]
async fn test_scrolls_through_three_pages() {
    let ctx = TestContext::new().await;
    let mut pages = Vec::new();
    for (page, first) in [(1, 1), (2, 9), (3, 17)] {
        let count = if page == 3 { 4 } else { 8 };
        let mock = ctx
            .server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/product/query")
                    .query_param("page", page.to_string())
                    .query_param("limit", "8");
                then.status(200).json_body(listing_page(first, count, 20, 3));
            })
            .await;
        pages.push(mock);
    }

    let storefront = ctx.launch().await;
    let catalog = storefront.catalog();

    catalog.fetch_products(false).await.unwrap();
    let state = catalog.snapshot();
    assert_eq!(state.products.len(), 8);
    assert_eq!(state.total_count, 20);
    assert_eq!(state.total_pages, 3);
    assert!(state.has_more);

    assert!(catalog.fetch_more_products().await.unwrap());
    assert!(catalog.fetch_more_products().await.unwrap());
    let state = catalog.snapshot();
    assert_eq!(state.products.len(), 20);
    assert_eq!(state.current_page, 3);
    assert!(!state.has_more);
    assert_eq!(state.products.last().unwrap().id.as_str(), "p20");

    // Past the last page nothing is requested
    assert!(!catalog.fetch_more_products().await.unwrap());
    for mock in &pages {
        mock.assert_calls_async(1).await;
    }
}

#[tokio::test]
async fn test_concurrent_load_more_requests_one_page() {
    let ctx = TestContext::new().await;
    ctx.server
        .mock_async(|when, then| {
            when.method(GET).path("/product/query").query_param("page", "1");
            then.status(200).json_body(listing_page(1, 8, 24, 3));
        })
        .await;
    let second = ctx
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/product/query").query_param("page", "2");
            then.status(200)
                .delay(std::time::Duration::from_millis(50))
                .json_body(listing_page(9, 8, 24, 3));
        })
        .await;

    let storefront = ctx.launch().await;
    let catalog = storefront.catalog();
    catalog.fetch_products(false).await.unwrap();

    let (a, b) = tokio::join!(catalog.fetch_more_products(), catalog.fetch_more_products());
    let loaded = [a.unwrap(), b.unwrap()];

    assert_eq!(loaded.iter().filter(|l| **l).count(), 1);
    second.assert_calls_async(1).await;
    let state = catalog.snapshot();
    assert_eq!(state.products.len(), 16);
    assert_eq!(state.current_page, 2);
    assert!(!state.is_loading_more);
}

#[tokio::test]
async fn test_filter_change_restarts_listing() {
    let ctx = TestContext::new().await;
    ctx.server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/product/query")
                .query_param("sort", "popular")
                .query_param("page", "1");
            then.status(200).json_body(listing_page(1, 8, 16, 2));
        })
        .await;
    ctx.server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/product/query")
                .query_param("sort", "popular")
                .query_param("page", "2");
            then.status(200).json_body(listing_page(9, 8, 16, 2));
        })
        .await;
    let filtered = ctx
        .server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/product/query")
                .query_param("category", "shoes")
                .query_param("sort", "price-asc")
                .query_param("page", "1");
            then.status(200).json_body(listing_page(100, 3, 3, 1));
        })
        .await;

    let storefront = ctx.launch().await;
    let catalog = storefront.catalog();
    catalog.fetch_products(false).await.unwrap();
    catalog.fetch_more_products().await.unwrap();
    assert_eq!(catalog.snapshot().current_page, 2);

    catalog.set_filters(
        ProductFiltersPatch::default()
            .category("shoes")
            .sort(ProductSort::PriceAsc),
    );
    catalog.fetch_products(false).await.unwrap();

    filtered.assert_async().await;
    let state = catalog.snapshot();
    assert_eq!(state.products.len(), 3);
    assert_eq!(state.current_page, 1);
    assert_eq!(state.filters.page, 1);
    assert!(!state.has_more);
    assert_eq!(state.products.first().unwrap().id.as_str(), "p100");
}

#[tokio::test]
async fn test_listing_failure_keeps_previous_products() {
    let ctx = TestContext::new().await;
    let mut ok = ctx
        .server
        .mock_async(|when, then| {
            when.method(GET).path("/product/query");
            then.status(200).json_body(listing_page(1, 8, 8, 1));
        })
        .await;

    let storefront = ctx.launch().await;
    let catalog = storefront.catalog();
    catalog.fetch_products(false).await.unwrap();
    ok.delete_async().await;

    ctx.server
        .mock_async(|when, then| {
            when.method(GET).path("/product/query");
            then.status(500).body("boom");
        })
        .await;
    catalog.fetch_products(false).await.unwrap_err();

    let state = catalog.snapshot();
    assert_eq!(state.products.len(), 8);
    assert!(!state.is_loading);
    assert_eq!(
        state.error.as_deref(),
        Some("Failed to load products. Please try again.")
    );
}
