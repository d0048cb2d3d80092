//! PocketShop client state layer.
//!
//! This crate holds everything a storefront screen talks to: an
//! authenticated REST client and four state containers (auth, catalog,
//! cart, wishlist), bundled in a [`Storefront`] that the application root
//! creates once and hands to its screens.
//!
//! # Architecture
//!
//! - [`api::ApiClient`] attaches the persisted bearer token to every request
//!   and retries once after refreshing it on a 401
//! - Each store publishes its state through a `tokio::sync::watch` channel;
//!   screens subscribe and re-render on change
//! - Only the auth session is persisted, through an injected
//!   [`storage::KeyValueStore`]

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod storage;
pub mod stores;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::ClientConfig;
pub use error::StoreError;
pub use state::Storefront;
