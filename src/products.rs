//! Products

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

/// Monetary amount used throughout the storefront.
pub type Price = Money<'static, Currency>;

/// Product identifier assigned by the remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Wrap a raw catalog identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw catalog identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product description
    pub description: String,

    /// Unit price
    pub price: Price,

    /// Image URL
    pub image: Option<String>,

    /// Category name, e.g. "Household"
    pub category: String,
}

impl Product {
    /// Capture the display fields of this product for a cart line.
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
        }
    }
}

/// Display fields of a product, captured when it was added to a cart.
///
/// Snapshots are never authoritative for pricing while the catalog can still
/// resolve the product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    /// Product name at add time
    pub name: String,

    /// Unit price at add time
    pub price: Price,

    /// Image URL at add time
    pub image: Option<String>,
}

impl ProductSnapshot {
    /// Create a snapshot without an image.
    pub fn new(name: impl Into<String>, price: Price) -> Self {
        Self {
            name: name.into(),
            price,
            image: None,
        }
    }
}

/// Category selection used by product listings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every product
    #[default]
    All,

    /// Products whose category equals the given name
    Named(String),
}

impl CategoryFilter {
    /// Whether the product belongs to the selected category.
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => product.category == *name,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Named(trimmed.to_string()))
        }
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::All => f.write_str("all"),
            Self::Named(name) => f.write_str(name),
        }
    }
}
