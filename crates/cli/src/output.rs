//! Terminal output.
//!
//! Everything the CLI shows the user goes through this module; tracing
//! logs go to stderr separately.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::BufRead;

use pocketshop_client::stores::CatalogState;
use pocketshop_core::{Banner, Category, Product, User};
use serde::Serialize;

use crate::error::CliError;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Json,
}

impl Format {
    pub const fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Table }
    }
}

pub fn message(text: &str) {
    println!("{text}");
}

/// Print `value` as pretty JSON.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Ask for one line of input on stderr and read it from stdin.
pub fn prompt(label: &str) -> Result<String, CliError> {
    eprint!("{label}: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub fn user(user: &User) {
    println!("{} <{}>", user.full_name(), user.phone);
    if let Some(email) = &user.email {
        println!("  email:  {email}");
    }
    println!("  role:   {}", user.role);
    println!("  orders: {} ({} spent)", user.total_orders, user.total_spent);
}

pub fn product_row(product: &Product) {
    let discount = product.discount_percentage();
    let badge = if discount > 0 {
        format!(" (-{discount}%)")
    } else {
        String::new()
    };
    println!(
        "{:<26} {:>10}{badge}  {}",
        product.id.as_str(),
        product.price.to_string(),
        product.title
    );
}

pub fn product_detail(product: &Product) {
    println!("{} [{}]", product.title, product.id);
    println!("  price:    {}", product.price);
    if let Some(compare_at) = &product.compare_at_price {
        println!("  was:      {compare_at}");
    }
    if let Some(category) = product.category.as_ref().and_then(|c| c.name()) {
        println!("  category: {category}");
    }
    println!("  brand:    {}", product.brand);
    println!("  stock:    {}", product.quantity);
    println!("  rating:   {:.1}", product.average_rating());
    if !product.colors.is_empty() {
        println!("  colors:   {}", product.colors.join(", "));
    }
    if !product.sizes.is_empty() {
        println!("  sizes:    {}", product.sizes.join(", "));
    }
    if let Some(image) = product.primary_image() {
        println!("  image:    {image}");
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
}

/// Listing table with the pagination footer.
pub fn listing(state: &CatalogState) {
    for product in &state.products {
        product_row(product);
    }
    println!(
        "-- {} of {} products, page {}/{}{}",
        state.products.len(),
        state.total_count,
        state.current_page,
        state.total_pages,
        if state.has_more { ", more available" } else { "" }
    );
}

pub fn category(category: &Category) {
    println!(
        "{:<26} {:<20} {}",
        category.id.as_str(),
        category.slug,
        category.name
    );
}

pub fn banner(banner: &Banner) {
    println!("{}", banner.title);
    if !banner.subtitle.is_empty() {
        println!("  {}", banner.subtitle);
    }
    println!("  [{}] -> {}", banner.button_text, banner.link);
}
