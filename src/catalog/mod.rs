//! Catalog
//!
//! The catalog is the source of truth for product names and prices. The cart
//! only ever reads from it through the [`Catalog`] trait.

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::products::{CategoryFilter, Product, ProductId};

pub mod fixtures;

/// Errors returned by catalog lookups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog has no product with this identifier.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// The catalog could not be queried.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Product lookup consumed by the cart.
#[cfg_attr(test, mockall::automock)]
pub trait Catalog {
    /// Look up a single product.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::NotFound`]: no product has this identifier.
    /// - [`CatalogError::Unavailable`]: the catalog could not be queried.
    fn product(&self, id: ProductId) -> Result<Product, CatalogError>;
}

/// Catalog held in memory, listing products in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: FxHashMap<ProductId, Product>,
    order: Vec<ProductId>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog from the given products.
    ///
    /// A later product with an already seen identifier replaces the earlier
    /// one but keeps its listing position.
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut catalog = Self::new();

        for product in products {
            catalog.insert(product);
        }

        catalog
    }

    /// Insert or replace a product, returning the previous entry.
    pub fn insert(&mut self, product: Product) -> Option<Product> {
        let id = product.id;
        let previous = self.products.insert(id, product);

        if previous.is_none() {
            self.order.push(id);
        }

        previous
    }

    /// Get a product by identifier.
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    /// Iterate over products in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.order.iter().filter_map(|id| self.products.get(id))
    }

    /// Iterate over products in the selected category, in listing order.
    pub fn by_category<'a>(
        &'a self,
        filter: &'a CategoryFilter,
    ) -> impl Iterator<Item = &'a Product> {
        self.iter().filter(move |product| filter.matches(product))
    }

    /// Distinct category names in listing order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();

        for product in self.iter() {
            if !categories.contains(&product.category.as_str()) {
                categories.push(product.category.as_str());
            }
        }

        categories
    }

    /// Get the number of products in the catalog.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Currency of the first listed product, or `None` for an empty catalog.
    pub fn currency(&self) -> Option<&'static Currency> {
        self.iter().next().map(|product| product.price.currency())
    }
}

impl Catalog for InMemoryCatalog {
    fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.get(id).cloned().ok_or(CatalogError::NotFound(id))
    }
}
