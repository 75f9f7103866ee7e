//! Prices

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};

use crate::products::Price;

/// Where a cart line's unit price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// Resolved from the catalog
    Catalog,

    /// Taken from the snapshot captured at add time
    Snapshot,

    /// Neither the catalog nor a snapshot could price the line
    Unknown,
}

/// Convert an amount in major units to minor units of the given currency.
///
/// Extra precision is rounded half away from zero.
///
/// Returns `None` if the value does not fit in an `i64`.
pub fn minor_units(amount: Decimal, currency: &Currency) -> Option<i64> {
    let scale = 10_i64.checked_pow(currency.exponent)?;

    amount
        .checked_mul(Decimal::from(scale))
        .and_then(|value| {
            value
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
}

/// Build a price from an amount in major units.
///
/// Returns `None` if the value does not fit in an `i64` of minor units.
pub fn price_from_major(amount: Decimal, currency: &'static Currency) -> Option<Price> {
    minor_units(amount, currency).map(|minor| Money::from_minor(minor, currency))
}

/// Calculates `unit * quantity`.
///
/// Returns `None` on overflow.
pub fn line_total(unit: &Price, quantity: u32) -> Option<Price> {
    unit.to_minor_units()
        .checked_mul(i64::from(quantity))
        .map(|minor| Money::from_minor(minor, unit.currency()))
}
