//! State containers backing the storefront screens.
//!
//! Each store owns a `tokio::sync::watch` channel. Mutations are short
//! synchronous sections on that channel and never span an `.await`, so a
//! store can be shared freely across tasks.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod wishlist;

pub use auth::{AuthStore, RegisterInput};
pub use cart::{CartState, CartStore};
pub use catalog::{CatalogState, CatalogStore};
pub use wishlist::{WishlistState, WishlistStore};
