//! Cart lines

use crate::products::{Product, ProductId, ProductSnapshot};

/// Name shown for lines that neither the catalog nor a snapshot can describe.
pub const UNKNOWN_PRODUCT: &str = "Unknown product";

/// Request to add a product to a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartLine {
    /// Product to add
    pub product_id: ProductId,

    /// Quantity to add; must be at least 1
    pub quantity: u32,

    /// Display fields captured at add time
    pub snapshot: Option<ProductSnapshot>,
}

impl NewCartLine {
    /// Add `quantity` of a product without a snapshot.
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            snapshot: None,
        }
    }

    /// Add `quantity` of a catalog product, capturing its snapshot.
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            quantity,
            snapshot: Some(product.snapshot()),
        }
    }

    /// Attach a snapshot.
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: ProductSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }
}

/// One product and its quantity in a cart.
///
/// Quantities are always at least 1; the cart removes lines instead of
/// keeping them at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    product_id: ProductId,
    quantity: u32,
    snapshot: Option<ProductSnapshot>,
}

impl CartLine {
    pub(crate) fn new(
        product_id: ProductId,
        quantity: u32,
        snapshot: Option<ProductSnapshot>,
    ) -> Self {
        debug_assert!(quantity > 0, "cart lines must have a positive quantity");

        Self {
            product_id,
            quantity,
            snapshot,
        }
    }

    /// Product in this line
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Quantity, at least 1
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Snapshot captured when the product was first added
    pub fn snapshot(&self) -> Option<&ProductSnapshot> {
        self.snapshot.as_ref()
    }

    /// Name from the snapshot, or [`UNKNOWN_PRODUCT`].
    pub fn display_name(&self) -> &str {
        self.snapshot
            .as_ref()
            .map_or(UNKNOWN_PRODUCT, |snapshot| snapshot.name.as_str())
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        debug_assert!(quantity > 0, "cart lines must have a positive quantity");

        self.quantity = quantity;
    }

    pub(crate) fn fill_snapshot(&mut self, snapshot: Option<ProductSnapshot>) {
        if self.snapshot.is_none() {
            self.snapshot = snapshot;
        }
    }
}
