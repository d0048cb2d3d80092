//! Integration tests for PocketShop.
//!
//! Every test drives a real [`Storefront`] against an `httpmock` server,
//! with the session persisted to a temporary directory. No external
//! services are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pocketshop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_*` - Sign-in, persistence across launches, session expiry
//! - `catalog_*` - Listing pagination and filter changes
//! - `cart_*` - Cart and wishlist flows

#![allow(clippy::unwrap_used)]

use std::path::Path;

use httpmock::MockServer;
use pocketshop_client::{ClientConfig, Storefront};
use serde_json::{Value, json};
use tempfile::TempDir;
use url::Url;

/// Storage key the client persists the session under.
pub const SESSION_KEY: &str = "auth-storage";

/// A mock API plus an on-disk storage directory that outlives any one
/// [`Storefront`].
pub struct TestContext {
    pub server: MockServer,
    pub storage: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start_async().await,
            storage: tempfile::tempdir().unwrap(),
        }
    }

    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(Url::parse(&self.server.base_url()).unwrap());
        config.storage_dir = self.storage.path().to_path_buf();
        config
    }

    /// Simulate an app launch: build the stores and restore the session.
    pub async fn launch(&self) -> Storefront {
        let storefront = Storefront::with_file_storage(self.config()).unwrap();
        storefront.start().await.unwrap();
        storefront
    }

    /// The persisted session document, if one was written.
    pub fn persisted_session(&self) -> Option<Value> {
        read_json(&self.storage.path().join(format!("{SESSION_KEY}.json")))
    }
}

fn read_json(path: &Path) -> Option<Value> {
    let text = std::fs::read_to_string(path).ok()?;
    Some(serde_json::from_str(&text).unwrap())
}

pub fn user_json(id: &str) -> Value {
    json!({
        "_id": id,
        "firstName": "Grace",
        "lastName": "Hopper",
        "email": "grace@example.com",
        "phone": "+15550123",
        "role": "user",
    })
}

pub fn login_json(user_id: &str, access: &str, refresh: &str) -> Value {
    json!({
        "user": user_json(user_id),
        "token": access,
        "refreshToken": refresh,
    })
}

/// Product JSON as the API returns it. `price` is a decimal string.
pub fn product_json(id: &str, price: &str) -> Value {
    json!({
        "_id": id,
        "title": format!("Product {id}"),
        "slug": format!("product-{id}"),
        "price": price,
        "quantity": 25,
        "images": [{"name": "main", "url": format!("https://cdn.example/{id}.jpg")}],
        "brand": "Pocket",
        "isPublished": true,
    })
}

/// One listing page of `count` products whose ids start at `first`.
pub fn listing_page(first: u32, count: u32, total: u64, total_pages: u32) -> Value {
    let products: Vec<Value> = (first..first + count)
        .map(|n| product_json(&format!("p{n}"), "10.00"))
        .collect();
    json!({
        "products": products,
        "stats": {"total": total, "pages": total_pages, "totalPages": total_pages},
    })
}
