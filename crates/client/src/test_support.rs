//! Fixtures shared by the unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use httpmock::MockServer;
use pocketshop_core::{AuthTokens, Product, User};
use serde_json::json;
use url::Url;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::session::AuthSession;
use crate::storage::MemoryStore;

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::new(Url::parse(&server.base_url()).unwrap())
}

pub fn user_json(id: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "firstName": "Ada",
        "lastName": "King",
        "email": "ada@example.com",
        "phone": "+15550100",
        "role": "user",
    })
}

pub fn sample_user(id: &str) -> User {
    serde_json::from_value(user_json(id)).unwrap()
}

/// Product JSON as the API returns it, priced in cents.
pub fn product_json(id: &str, price_cents: i64) -> serde_json::Value {
    let price = price_string(price_cents);
    json!({
        "_id": id,
        "title": format!("Product {id}"),
        "slug": format!("product-{id}"),
        "price": price,
        "quantity": 10,
        "images": [{"name": "front", "url": format!("https://cdn.example/{id}.jpg")}],
        "brand": "Acme",
        "isPublished": true,
        "colors": ["red", "blue"],
        "sizes": ["M", "L"],
    })
}

pub fn sample_product(id: &str, price_cents: i64) -> Product {
    serde_json::from_value(product_json(id, price_cents)).unwrap()
}

fn price_string(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// A session holding `sample_user("u1")` and the given tokens.
pub async fn authenticated_session(access: &str, refresh: &str) -> Arc<AuthSession> {
    let session = Arc::new(AuthSession::new(Arc::new(MemoryStore::new()), "auth-storage"));
    session
        .commit(|state| {
            state.user = Some(sample_user("u1"));
            state.tokens = Some(AuthTokens::new(access, refresh));
        })
        .await;
    session
}

/// An API client whose session is signed in, plus the backing storage.
pub async fn authenticated_api(
    server: &MockServer,
    access: &str,
    refresh: &str,
) -> (ApiClient, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::new());
    let session = Arc::new(AuthSession::new(storage.clone(), "auth-storage"));
    session
        .commit(|state| {
            state.user = Some(sample_user("u1"));
            state.tokens = Some(AuthTokens::new(access, refresh));
        })
        .await;
    (ApiClient::new(&config_for(server), session).unwrap(), storage)
}

pub fn anonymous_api(server: &MockServer) -> ApiClient {
    let session = Arc::new(AuthSession::new(Arc::new(MemoryStore::new()), "auth-storage"));
    ApiClient::new(&config_for(server), session).unwrap()
}
