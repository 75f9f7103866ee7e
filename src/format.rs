//! Price formatting

use crate::products::Price;

/// Largest number of fraction digits a format will render.
pub const MAX_DECIMALS: u32 = 18;

/// Renders prices as `"<ISO code> <grouped amount>[.<fraction>]"`.
///
/// The output only depends on the amount, its currency and the format
/// settings, e.g. `UGX 15,000` or `GBP 12.50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceFormat {
    decimals: Option<u32>,
    group_separator: char,
    decimal_separator: char,
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self {
            decimals: None,
            group_separator: ',',
            decimal_separator: '.',
        }
    }
}

impl PriceFormat {
    /// Format with the currency's own number of fraction digits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Format whole units only, rounding half up.
    pub fn whole_units() -> Self {
        Self::default().with_decimals(0)
    }

    /// Use a fixed number of fraction digits instead of the currency exponent.
    #[must_use]
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals.min(MAX_DECIMALS));
        self
    }

    /// Use different digit group and decimal separators.
    #[must_use]
    pub fn with_separators(mut self, group: char, decimal: char) -> Self {
        self.group_separator = group;
        self.decimal_separator = decimal;
        self
    }

    /// Fixed fraction digits, if any.
    pub fn decimals(&self) -> Option<u32> {
        self.decimals
    }

    /// Render a price.
    pub fn format(&self, amount: &Price) -> String {
        let currency = amount.currency();
        let exponent = currency.exponent.min(MAX_DECIMALS);
        let decimals = self.decimals.unwrap_or(exponent);

        let minor = amount.to_minor_units();
        let scaled = rescale(u128::from(minor.unsigned_abs()), exponent, decimals);
        let divisor = 10_u128.pow(decimals);
        let whole = scaled / divisor;
        let fraction = scaled % divisor;

        let mut out = String::new();

        if minor < 0 && scaled > 0 {
            out.push('-');
        }

        out.push_str(currency.iso_alpha_code);
        out.push(' ');
        out.push_str(&group_digits(whole, self.group_separator));

        if decimals > 0 {
            let width = usize::try_from(decimals).unwrap_or_default();

            out.push(self.decimal_separator);
            out.push_str(&format!("{fraction:0width$}"));
        }

        out
    }
}

fn rescale(minor: u128, exponent: u32, decimals: u32) -> u128 {
    if decimals >= exponent {
        return minor.saturating_mul(10_u128.pow(decimals - exponent));
    }

    let divisor = 10_u128.pow(exponent - decimals);

    (minor + divisor / 2) / divisor
}

fn group_digits(value: u128, separator: char) -> String {
    let digits = value.to_string();
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);

    for (idx, digit) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            grouped.push(separator);
        }

        grouped.push(digit);
    }

    grouped
}
