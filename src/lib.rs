//! Storefront
//!
//! Storefront is the session-side core of a small cleaning business shop: a
//! product catalog, a shopping cart that prices itself from that catalog, and
//! a client for the shop's REST API.
//!
//! ```
//! use rusty_money::{Money, iso};
//! use storefront::prelude::*;
//!
//! let mut cart = CartStore::new(iso::UGX).with_format(PriceFormat::whole_units());
//!
//! cart.add_to_cart(
//!     NewCartLine::new(ProductId::new(1), 2)
//!         .with_snapshot(ProductSnapshot::new("Glass Cleaner", Money::from_major(15_000, iso::UGX))),
//! )?;
//!
//! assert_eq!(cart.format_price(&cart.cart_total()?), "UGX 30,000");
//! # Ok::<(), CartError>(())
//! ```

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod format;
pub mod observability;
pub mod prelude;
pub mod pricing;
pub mod products;
