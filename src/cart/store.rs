//! Cart store

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    rc::Rc,
};

use rusty_money::{Money, iso::Currency};
use tracing::{debug, warn};

use crate::{
    cart::{
        errors::CartError,
        events::{CartEvent, CartObserver, Dispatch, SubscriptionKey, Subscribers},
        lines::{CartLine, NewCartLine, UNKNOWN_PRODUCT},
    },
    catalog::Catalog,
    format::PriceFormat,
    pricing::{PriceSource, line_total},
    products::{Price, ProductId},
};

/// A cart line with its name and prices resolved for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLine {
    /// Product in this line
    pub product_id: ProductId,

    /// Catalog name, snapshot name, or "Unknown product"
    pub name: String,

    /// Quantity
    pub quantity: u32,

    /// Unit price used for the total
    pub unit_price: Price,

    /// `unit_price * quantity`
    pub total: Price,

    /// Where the unit price came from
    pub source: PriceSource,
}

/// Aggregate view of a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSummary {
    /// Number of distinct lines
    pub lines: usize,

    /// Sum of line quantities
    pub items: u64,

    /// Cart total
    pub total: Price,
}

impl CartSummary {
    /// Short confirmation shown after a product is added.
    pub fn notice(&self) -> String {
        let noun = if self.items == 1 { "item" } else { "items" };

        format!("Cart updated! ({} {noun})", self.items)
    }
}

struct Resolution {
    name: String,
    unit_price: Price,
    source: PriceSource,
}

/// In-memory cart for a single session.
///
/// Holds at most one line per product, in the order products were first
/// added. Prices come from the catalog when it can resolve a product and from
/// the line's snapshot otherwise.
pub struct CartStore {
    lines: Vec<CartLine>,
    currency: &'static Currency,
    catalog: Option<Rc<dyn Catalog>>,
    format: PriceFormat,
    subscribers: Subscribers,
}

impl CartStore {
    /// Create an empty cart priced from line snapshots only.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
            catalog: None,
            format: PriceFormat::default(),
            subscribers: Subscribers::default(),
        }
    }

    /// Create an empty cart priced from the given catalog.
    pub fn with_catalog(currency: &'static Currency, catalog: Rc<dyn Catalog>) -> Self {
        let mut store = Self::new(currency);
        store.catalog = Some(catalog);
        store
    }

    /// Use the given format for [`CartStore::format_price`].
    #[must_use]
    pub fn with_format(mut self, format: PriceFormat) -> Self {
        self.format = format;
        self
    }

    /// Add a product, merging with an existing line for the same product.
    ///
    /// Returns the line's quantity after the add.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: the quantity is zero.
    /// - [`CartError::QuantityOverflow`]: the merged quantity does not fit.
    pub fn add_to_cart(&mut self, item: NewCartLine) -> Result<u32, CartError> {
        let (quantity, event) = self.apply_add(item)?;

        self.subscribers.notify(&event);

        Ok(quantity)
    }

    /// Remove a product's line. Removing an absent product does nothing.
    ///
    /// Returns whether a line was removed.
    pub fn remove_from_cart(&mut self, product_id: ProductId) -> bool {
        let Some(event) = self.apply_remove(product_id) else {
            return false;
        };

        self.subscribers.notify(&event);

        true
    }

    /// Overwrite a line's quantity; zero removes the line.
    ///
    /// Returns whether a line for the product existed.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        let Some(event) = self.apply_set_quantity(product_id, quantity) else {
            return false;
        };

        self.subscribers.notify(&event);

        true
    }

    /// Remove every line.
    pub fn clear_cart(&mut self) {
        let event = self.apply_clear();

        self.subscribers.notify(&event);
    }

    /// Calculates `quantity * unit price` for a line.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`]: the unit price is not in the cart currency.
    /// - [`CartError::Overflow`]: the total does not fit in minor units.
    pub fn item_total(&self, line: &CartLine) -> Result<Price, CartError> {
        let resolution = self.resolve(line);

        self.total_for(line, &resolution.unit_price)
    }

    /// Calculates the sum of all line totals, zero for an empty cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a line total cannot be calculated or the sum
    /// overflows.
    pub fn cart_total(&self) -> Result<Price, CartError> {
        let zero = Money::from_minor(0, self.currency);

        self.lines.iter().try_fold(zero, |acc, line| {
            let total = self.item_total(line)?;

            acc.add(total).map_err(CartError::from)
        })
    }

    /// Render an amount with the cart's price format.
    pub fn format_price(&self, amount: &Price) -> String {
        self.format.format(amount)
    }

    /// Resolve a line's name and prices for display.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the line total cannot be calculated.
    pub fn resolve_line(&self, line: &CartLine) -> Result<ResolvedLine, CartError> {
        let resolution = self.resolve(line);
        let total = self.total_for(line, &resolution.unit_price)?;

        Ok(ResolvedLine {
            product_id: line.product_id(),
            name: resolution.name,
            quantity: line.quantity(),
            unit_price: resolution.unit_price,
            total,
            source: resolution.source,
        })
    }

    /// Summarise the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart total cannot be calculated.
    pub fn summary(&self) -> Result<CartSummary, CartError> {
        Ok(CartSummary {
            lines: self.len(),
            items: self.item_count(),
            total: self.cart_total()?,
        })
    }

    /// Sum of line quantities.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Lines in the order products were first added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Get the line for a product.
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.product_id() == product_id)
    }

    /// Get the number of distinct lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Get the price format of the cart.
    pub fn price_format(&self) -> PriceFormat {
        self.format
    }

    /// Register an observer for every later mutation.
    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) -> SubscriptionKey {
        self.subscribers.insert(observer)
    }

    /// Stop notifying an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.subscribers.remove(key)
    }

    pub(crate) fn dispatch_list(&self) -> Dispatch {
        self.subscribers.dispatch_list()
    }

    pub(crate) fn apply_add(&mut self, item: NewCartLine) -> Result<(u32, CartEvent), CartError> {
        let NewCartLine {
            product_id,
            quantity: added,
            snapshot,
        } = item;

        if added == 0 {
            return Err(CartError::InvalidQuantity(product_id));
        }

        let quantity = if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)
        {
            let quantity = line
                .quantity()
                .checked_add(added)
                .ok_or(CartError::QuantityOverflow(product_id))?;

            line.set_quantity(quantity);
            line.fill_snapshot(snapshot);

            quantity
        } else {
            self.lines.push(CartLine::new(product_id, added, snapshot));

            added
        };

        debug!(%product_id, added, quantity, "added to cart");

        let event = CartEvent::Added {
            product_id,
            added,
            quantity,
        };

        Ok((quantity, event))
    }

    pub(crate) fn apply_remove(&mut self, product_id: ProductId) -> Option<CartEvent> {
        let idx = self
            .lines
            .iter()
            .position(|line| line.product_id() == product_id)?;

        self.lines.remove(idx);

        debug!(%product_id, "removed from cart");

        Some(CartEvent::Removed { product_id })
    }

    pub(crate) fn apply_set_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Option<CartEvent> {
        if quantity == 0 {
            return self.apply_remove(product_id);
        }

        let line = self
            .lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)?;

        line.set_quantity(quantity);

        debug!(%product_id, quantity, "cart quantity changed");

        Some(CartEvent::QuantityChanged {
            product_id,
            quantity,
        })
    }

    pub(crate) fn apply_clear(&mut self) -> CartEvent {
        let lines = self.lines.len();

        self.lines.clear();

        debug!(lines, "cart cleared");

        CartEvent::Cleared { lines }
    }

    fn resolve(&self, line: &CartLine) -> Resolution {
        let product_id = line.product_id();

        if let Some(catalog) = &self.catalog {
            match catalog.product(product_id) {
                Ok(product) => {
                    return Resolution {
                        name: product.name,
                        unit_price: product.price,
                        source: PriceSource::Catalog,
                    };
                }
                Err(error) => {
                    warn!(%product_id, %error, "catalog lookup failed, using snapshot");
                }
            }
        }

        if let Some(snapshot) = line.snapshot() {
            return Resolution {
                name: snapshot.name.clone(),
                unit_price: snapshot.price,
                source: PriceSource::Snapshot,
            };
        }

        warn!(%product_id, "no price for cart line, counting it as zero");

        Resolution {
            name: UNKNOWN_PRODUCT.to_string(),
            unit_price: Money::from_minor(0, self.currency),
            source: PriceSource::Unknown,
        }
    }

    fn total_for(&self, line: &CartLine, unit_price: &Price) -> Result<Price, CartError> {
        let currency = unit_price.currency();

        if currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                line.product_id(),
                currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        line_total(unit_price, line.quantity()).ok_or(CartError::Overflow)
    }
}

impl Debug for CartStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartStore")
            .field("lines", &self.lines)
            .field("currency", &self.currency.iso_alpha_code)
            .field("catalog", &self.catalog.is_some())
            .field("format", &self.format)
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{
        catalog::{CatalogError, InMemoryCatalog, MockCatalog},
        products::{Product, ProductSnapshot},
    };

    use super::*;

    fn gbp(minor: i64) -> Price {
        Money::from_minor(minor, iso::GBP)
    }

    fn line(id: i64, quantity: u32, price: i64) -> NewCartLine {
        NewCartLine::new(ProductId::new(id), quantity)
            .with_snapshot(ProductSnapshot::new(format!("Product {id}"), gbp(price)))
    }

    fn product(id: i64, name: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: String::new(),
            price: gbp(price),
            image: None,
            category: "Household".to_string(),
        }
    }

    #[test]
    fn new_cart_is_empty() -> TestResult {
        let cart = CartStore::new(iso::GBP);

        assert!(cart.is_empty());
        assert_eq!(cart.len(), 0);
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.cart_total()?, gbp(0));
        assert_eq!(cart.currency(), iso::GBP);

        Ok(())
    }

    #[test]
    fn adding_same_product_merges_quantities() -> TestResult {
        let mut cart = CartStore::new(iso::GBP);

        assert_eq!(cart.add_to_cart(line(1, 1, 1_000))?, 1);
        assert_eq!(cart.add_to_cart(line(1, 2, 1_000))?, 3);

        assert_eq!(cart.len(), 1);
        assert_eq!(
            cart.line(ProductId::new(1)).map(CartLine::quantity),
            Some(3)
        );

        Ok(())
    }

    #[test]
    fn adding_distinct_products_preserves_order() -> TestResult {
        let mut cart = CartStore::new(iso::GBP);

        cart.add_to_cart(line(3, 1, 100))?;
        cart.add_to_cart(line(1, 1, 100))?;
        cart.add_to_cart(line(3, 1, 100))?;
        cart.add_to_cart(line(2, 1, 100))?;

        let ids: Vec<i64> = cart
            .lines()
            .iter()
            .map(|line| line.product_id().get())
            .collect();

        assert_eq!(ids, [3, 1, 2]);

        Ok(())
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut cart = CartStore::new(iso::GBP);

        let result = cart.add_to_cart(line(1, 0, 100));

        assert_eq!(result, Err(CartError::InvalidQuantity(ProductId::new(1))));
        assert!(cart.is_empty());
    }

    #[test]
    fn quantity_overflow_is_rejected_without_change() -> TestResult {
        let mut cart = CartStore::new(iso::GBP);

        cart.add_to_cart(line(1, u32::MAX, 1))?;

        let result = cart.add_to_cart(line(1, 1, 1));

        assert_eq!(result, Err(CartError::QuantityOverflow(ProductId::new(1))));
        assert_eq!(
            cart.line(ProductId::new(1)).map(CartLine::quantity),
            Some(u32::MAX)
        );

        Ok(())
    }

    #[test]
    fn remove_is_idempotent() -> TestResult {
        let mut cart = CartStore::new(iso::GBP);

        cart.add_to_cart(line(1, 1, 100))?;

        assert!(cart.remove_from_cart(ProductId::new(1)));
        assert!(!cart.remove_from_cart(ProductId::new(1)));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn set_quantity_overwrites_and_zero_removes() -> TestResult {
        let mut cart = CartStore::new(iso::GBP);

        cart.add_to_cart(line(1, 2, 100))?;
        cart.add_to_cart(line(2, 1, 100))?;

        assert!(cart.set_quantity(ProductId::new(1), 5));
        assert_eq!(cart.item_count(), 6);

        assert!(cart.set_quantity(ProductId::new(1), 0));
        assert!(cart.line(ProductId::new(1)).is_none());
        assert_eq!(cart.len(), 1);

        assert!(!cart.set_quantity(ProductId::new(9), 3));

        Ok(())
    }

    #[test]
    fn clear_empties_cart() -> TestResult {
        let mut cart = CartStore::new(iso::GBP);

        cart.add_to_cart(line(1, 2, 100))?;
        cart.add_to_cart(line(2, 3, 100))?;
        cart.clear_cart();

        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.cart_total()?, gbp(0));

        Ok(())
    }

    #[test]
    fn cart_total_sums_item_totals() -> TestResult {
        let mut cart = CartStore::new(iso::GBP);

        cart.add_to_cart(line(1, 1, 1_000))?;
        cart.add_to_cart(line(2, 2, 500))?;

        assert_eq!(cart.cart_total()?, gbp(2_000));

        let sum = cart
            .lines()
            .iter()
            .map(|line| cart.item_total(line).map(|total| total.to_minor_units()))
            .sum::<Result<i64, CartError>>()?;

        assert_eq!(sum, 2_000);

        Ok(())
    }

    #[test]
    fn catalog_price_wins_over_snapshot() -> TestResult {
        let catalog = InMemoryCatalog::from_products([product(1, "Glass Cleaner", 700)]);
        let mut cart = CartStore::with_catalog(iso::GBP, Rc::new(catalog));

        cart.add_to_cart(line(1, 2, 500))?;

        let first = cart.lines().first().ok_or("expected a line")?;
        let resolved = cart.resolve_line(first)?;

        assert_eq!(resolved.name, "Glass Cleaner");
        assert_eq!(resolved.unit_price, gbp(700));
        assert_eq!(resolved.total, gbp(1_400));
        assert_eq!(resolved.source, PriceSource::Catalog);
        assert_eq!(cart.cart_total()?, gbp(1_400));

        Ok(())
    }

    #[test]
    fn catalog_failure_falls_back_to_snapshot() -> TestResult {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_product()
            .returning(|_id| Err(CatalogError::Unavailable("offline".to_string())));

        let mut cart = CartStore::with_catalog(iso::GBP, Rc::new(catalog));

        cart.add_to_cart(line(1, 3, 250))?;

        let first = cart.lines().first().ok_or("expected a line")?;
        let resolved = cart.resolve_line(first)?;

        assert_eq!(resolved.name, "Product 1");
        assert_eq!(resolved.source, PriceSource::Snapshot);
        assert_eq!(cart.cart_total()?, gbp(750));

        Ok(())
    }

    #[test]
    fn unresolvable_line_is_unknown_and_free() -> TestResult {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_product()
            .returning(|id| Err(CatalogError::NotFound(id)));

        let mut cart = CartStore::with_catalog(iso::GBP, Rc::new(catalog));

        cart.add_to_cart(NewCartLine::new(ProductId::new(5), 2))?;
        cart.add_to_cart(line(6, 1, 300))?;

        let first = cart.lines().first().ok_or("expected a line")?;
        let resolved = cart.resolve_line(first)?;

        assert_eq!(resolved.name, UNKNOWN_PRODUCT);
        assert_eq!(resolved.source, PriceSource::Unknown);
        assert_eq!(resolved.total, gbp(0));
        assert_eq!(cart.cart_total()?, gbp(300));

        Ok(())
    }

    #[test]
    fn catalog_is_queried_per_line() -> TestResult {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_product()
            .times(2)
            .returning(|id| Ok(product(id.get(), "Tyre Shine", 200)));

        let mut cart = CartStore::with_catalog(iso::GBP, Rc::new(catalog));

        cart.add_to_cart(NewCartLine::new(ProductId::new(1), 1))?;
        cart.add_to_cart(NewCartLine::new(ProductId::new(2), 1))?;

        assert_eq!(cart.cart_total()?, gbp(400));

        Ok(())
    }

    #[test]
    fn foreign_currency_price_is_an_error() -> TestResult {
        let mut cart = CartStore::new(iso::GBP);

        cart.add_to_cart(
            NewCartLine::new(ProductId::new(1), 1)
                .with_snapshot(ProductSnapshot::new("Import", Money::from_minor(100, iso::USD))),
        )?;

        assert_eq!(
            cart.cart_total(),
            Err(CartError::CurrencyMismatch(
                ProductId::new(1),
                iso::USD.iso_alpha_code,
                iso::GBP.iso_alpha_code,
            ))
        );

        Ok(())
    }

    #[test]
    fn line_total_overflow_is_an_error() -> TestResult {
        let mut cart = CartStore::new(iso::GBP);

        cart.add_to_cart(line(1, 2, i64::MAX))?;

        assert_eq!(cart.cart_total(), Err(CartError::Overflow));

        Ok(())
    }

    #[test]
    fn later_snapshot_fills_missing_one() -> TestResult {
        let mut cart = CartStore::new(iso::GBP);

        cart.add_to_cart(NewCartLine::new(ProductId::new(1), 1))?;
        cart.add_to_cart(line(1, 1, 400))?;

        assert_eq!(cart.cart_total()?, gbp(800));

        Ok(())
    }

    #[test]
    fn observers_see_mutations_in_order() -> TestResult {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut cart = CartStore::new(iso::GBP);
        cart.subscribe(move |event: &CartEvent| sink.borrow_mut().push(event.clone()));

        cart.add_to_cart(line(1, 1, 100))?;
        cart.add_to_cart(line(1, 2, 100))?;
        cart.set_quantity(ProductId::new(1), 4);
        cart.remove_from_cart(ProductId::new(2));
        cart.remove_from_cart(ProductId::new(1));
        cart.clear_cart();

        let product_id = ProductId::new(1);

        assert_eq!(
            *seen.borrow(),
            [
                CartEvent::Added {
                    product_id,
                    added: 1,
                    quantity: 1
                },
                CartEvent::Added {
                    product_id,
                    added: 2,
                    quantity: 3
                },
                CartEvent::QuantityChanged {
                    product_id,
                    quantity: 4
                },
                CartEvent::Removed { product_id },
                CartEvent::Cleared { lines: 0 },
            ]
        );

        Ok(())
    }

    #[test]
    fn rejected_add_does_not_notify() {
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);

        let mut cart = CartStore::new(iso::GBP);
        cart.subscribe(move |_event: &CartEvent| *sink.borrow_mut() += 1);

        let result = cart.add_to_cart(line(1, 0, 100));

        assert!(result.is_err(), "zero quantity should be rejected");
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn unsubscribed_observer_stops_receiving() -> TestResult {
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);

        let mut cart = CartStore::new(iso::GBP);
        let key = cart.subscribe(move |_event: &CartEvent| *sink.borrow_mut() += 1);

        cart.add_to_cart(line(1, 1, 100))?;

        assert!(cart.unsubscribe(key));

        cart.add_to_cart(line(1, 1, 100))?;

        assert_eq!(*count.borrow(), 1);

        Ok(())
    }

    #[test]
    fn summary_notice_pluralises() -> TestResult {
        let mut cart = CartStore::new(iso::GBP);

        cart.add_to_cart(line(1, 1, 100))?;

        assert_eq!(cart.summary()?.notice(), "Cart updated! (1 item)");

        cart.add_to_cart(line(2, 2, 100))?;

        let summary = cart.summary()?;

        assert_eq!(summary.lines, 2);
        assert_eq!(summary.items, 3);
        assert_eq!(summary.total, gbp(300));
        assert_eq!(summary.notice(), "Cart updated! (3 items)");

        Ok(())
    }

    #[test]
    fn format_price_uses_cart_format() {
        let cart = CartStore::new(iso::GBP).with_format(PriceFormat::whole_units());

        assert_eq!(cart.format_price(&gbp(1_250)), "GBP 13");
        assert_eq!(cart.price_format(), PriceFormat::whole_units());
    }
}
