//! Catalog Fixtures
//!
//! Loads a catalog from YAML, for offline use and tests:
//!
//! ```yaml
//! products:
//!   - id: 1
//!     name: Glass Cleaner
//!     price: "15000 UGX"
//!     category: Household
//! ```

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rusty_money::{Findable, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    catalog::InMemoryCatalog,
    pricing::price_from_major,
    products::{Price, Product, ProductId},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// The same product identifier appears twice
    #[error("Duplicate product id: {0}")]
    DuplicateProduct(ProductId),
}

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Products in listing order
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product identifier
    pub id: i64,

    /// Product name
    pub name: String,

    /// Product description
    #[serde(default)]
    pub description: String,

    /// Product price (e.g., "15000 UGX")
    pub price: String,

    /// Image URL
    #[serde(default)]
    pub image: Option<String>,

    /// Category name
    pub category: String,
}

impl TryFrom<ProductFixture> for Product {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let price = parse_price(&fixture.price)?;

        Ok(Product {
            id: ProductId::new(fixture.id),
            name: fixture.name,
            description: fixture.description,
            price,
            image: fixture.image,
            category: fixture.category,
        })
    }
}

/// Parse price string (e.g., "2.99 GBP") into a price in that currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<Price, FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency =
        Currency::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    price_from_major(amount, currency).ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))
}

impl InMemoryCatalog {
    /// Parse a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, a price cannot be parsed,
    /// products use more than one currency, or an identifier repeats.
    pub fn from_yaml_str(contents: &str) -> Result<Self, FixtureError> {
        let fixture: CatalogFixture = serde_norway::from_str(contents)?;

        let mut catalog = InMemoryCatalog::new();
        let mut currency: Option<&'static Currency> = None;

        for product_fixture in fixture.products {
            let product = Product::try_from(product_fixture)?;
            let product_currency = product.price.currency();

            // Validate currency consistency
            if let Some(existing_currency) = currency {
                if existing_currency != product_currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        product_currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                currency = Some(product_currency);
            }

            let id = product.id;

            if catalog.insert(product).is_some() {
                return Err(FixtureError::DuplicateProduct(id));
            }
        }

        Ok(catalog)
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, see
    /// [`InMemoryCatalog::from_yaml_str`].
    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }
}
