//! Cart errors.

use rusty_money::MoneyError;
use thiserror::Error;

use crate::products::ProductId;

/// Errors related to cart mutations and totals.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// Quantities added to a cart must be at least one.
    #[error("quantity for product {0} must be at least 1")]
    InvalidQuantity(ProductId),

    /// Merging quantities would exceed the largest representable quantity.
    #[error("quantity for product {0} is too large")]
    QuantityOverflow(ProductId),

    /// A line total or cart total does not fit in minor units.
    #[error("price arithmetic overflowed")]
    Overflow,

    /// A price is in a different currency from the cart (product, price currency, cart currency).
    #[error("product {0} is priced in {1}, but the cart uses {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// A cart was requested from a context that was never given one.
    #[error("cart context is not initialized")]
    Uninitialized,
}
