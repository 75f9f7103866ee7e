//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    api::{ApiClient, ApiConfig, ApiError},
    cart::{
        CartContext, CartError, CartEvent, CartHandle, CartLine, CartObserver, CartReceipt,
        CartStore, CartSummary, NewCartLine, NoopObserver, ReceiptError, ResolvedLine,
        SubscriptionKey,
    },
    catalog::{Catalog, CatalogError, InMemoryCatalog, fixtures::FixtureError},
    format::PriceFormat,
    pricing::PriceSource,
    products::{CategoryFilter, Price, Product, ProductId, ProductSnapshot},
};
