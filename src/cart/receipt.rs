//! Cart receipt

use std::io;

use rusty_money::Money;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{
        errors::CartError,
        store::{CartStore, CartSummary, ResolvedLine},
    },
    format::PriceFormat,
    pricing::PriceSource,
};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating cart totals.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Resolved lines and totals of a cart at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct CartReceipt {
    lines: Vec<ResolvedLine>,
    summary: CartSummary,
}

impl CartReceipt {
    /// Build a receipt from the current cart contents.
    ///
    /// Each line is resolved once; the total is the sum of the resolved line
    /// totals.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a line or the cart total cannot be calculated.
    pub fn from_store(cart: &CartStore) -> Result<Self, ReceiptError> {
        let lines = cart
            .lines()
            .iter()
            .map(|line| cart.resolve_line(line))
            .collect::<Result<Vec<_>, _>>()?;

        let zero = Money::from_minor(0, cart.currency());
        let total = lines.iter().try_fold(zero, |acc, line| {
            acc.add(line.total).map_err(CartError::from)
        })?;

        let summary = CartSummary {
            lines: lines.len(),
            items: cart.item_count(),
            total,
        };

        Ok(Self { lines, summary })
    }

    /// Resolved lines in cart order.
    pub fn lines(&self) -> &[ResolvedLine] {
        &self.lines
    }

    /// Cart totals.
    pub fn summary(&self) -> &CartSummary {
        &self.summary
    }

    /// Writes the receipt as a table followed by the total.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write, format: &PriceFormat) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Qty", "Unit Price", "Total"]);

        for (idx, line) in self.lines.iter().enumerate() {
            let name = match line.source {
                PriceSource::Snapshot => format!("{} (saved price)", line.name),
                PriceSource::Catalog | PriceSource::Unknown => line.name.clone(),
            };

            builder.push_record([
                format!("#{:<3}", idx + 1),
                name,
                line.quantity.to_string(),
                format.format(&line.unit_price),
                format.format(&line.total),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| ReceiptError::IO)?;

        writeln!(
            out,
            " Items: {}\n Total: {}",
            self.summary.items,
            format.format(&self.summary.total)
        )
        .map_err(|_err| ReceiptError::IO)
    }
}
