//! PocketShop Core - Shared data model.
//!
//! This crate provides the types exchanged between the PocketShop client
//! state layer and the storefront REST API:
//! - `client` - API client and the auth, catalog, cart and wishlist stores
//! - `cli` - Command-line driver for the stores
//!
//! # Architecture
//!
//! The core crate contains only types and pure derived values - no I/O, no
//! HTTP clients, no persistence. This keeps it lightweight and lets screens
//! and tests construct any value directly.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, prices, phone numbers, catalog records, the
//!   filter descriptor and cart lines

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
