//! Core types for PocketShop.
//!
//! This module provides type-safe wrappers and wire records for the
//! storefront domain.

pub mod cart;
pub mod catalog;
pub mod filters;
pub mod id;
pub mod phone;
pub mod price;
pub mod product;
pub mod role;
pub mod user;

pub use cart::{CartItem, CartLineKey};
pub use catalog::{Banner, Category};
pub use filters::{ProductFilters, ProductFiltersPatch, ProductSort};
pub use id::*;
pub use phone::{Phone, PhoneError};
pub use price::Price;
pub use product::{CategoryRef, Product, ProductImage, ProductRating};
pub use role::{RoleParseError, UserRole};
pub use user::{AuthTokens, User};
