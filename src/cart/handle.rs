//! Shared cart handles.
//!
//! Presentation code receives a [`CartHandle`] (or a [`CartContext`] it can
//! ask for one) instead of reaching for a global cart.

use std::{cell::RefCell, rc::Rc};

use crate::{
    cart::{
        errors::CartError,
        events::{CartEvent, CartObserver, SubscriptionKey, notify_all},
        lines::NewCartLine,
        store::{CartStore, CartSummary},
    },
    products::{Price, ProductId},
};

/// Cheaply clonable handle to one session's cart.
///
/// Mutations release the cart before observers run, so an observer holding a
/// clone of the handle can read the cart while it is being notified.
#[derive(Debug, Clone)]
pub struct CartHandle {
    store: Rc<RefCell<CartStore>>,
}

impl CartHandle {
    /// Share a cart store.
    pub fn new(store: CartStore) -> Self {
        Self {
            store: Rc::new(RefCell::new(store)),
        }
    }

    /// Add a product, merging with an existing line for the same product.
    ///
    /// # Errors
    ///
    /// See [`CartStore::add_to_cart`].
    pub fn add_to_cart(&self, item: NewCartLine) -> Result<u32, CartError> {
        let (quantity, event) = self.store.borrow_mut().apply_add(item)?;

        self.notify(&event);

        Ok(quantity)
    }

    /// Remove a product's line. Returns whether a line was removed.
    pub fn remove_from_cart(&self, product_id: ProductId) -> bool {
        let Some(event) = self.store.borrow_mut().apply_remove(product_id) else {
            return false;
        };

        self.notify(&event);

        true
    }

    /// Overwrite a line's quantity; zero removes the line.
    pub fn set_quantity(&self, product_id: ProductId, quantity: u32) -> bool {
        let Some(event) = self
            .store
            .borrow_mut()
            .apply_set_quantity(product_id, quantity)
        else {
            return false;
        };

        self.notify(&event);

        true
    }

    /// Remove every line.
    pub fn clear_cart(&self) {
        let event = self.store.borrow_mut().apply_clear();

        self.notify(&event);
    }

    /// Register an observer for every later mutation.
    pub fn subscribe(&self, observer: impl CartObserver + 'static) -> SubscriptionKey {
        self.store.borrow_mut().subscribe(observer)
    }

    /// Stop notifying an observer. Returns whether it was registered.
    pub fn unsubscribe(&self, key: SubscriptionKey) -> bool {
        self.store.borrow_mut().unsubscribe(key)
    }

    /// Run a read-only query against the cart.
    pub fn read<R>(&self, query: impl FnOnce(&CartStore) -> R) -> R {
        query(&self.store.borrow())
    }

    /// Total for a product's line, if the product is in the cart.
    ///
    /// # Errors
    ///
    /// See [`CartStore::item_total`].
    pub fn item_total(&self, product_id: ProductId) -> Result<Option<Price>, CartError> {
        self.read(|cart| {
            cart.line(product_id)
                .map(|line| cart.item_total(line))
                .transpose()
        })
    }

    /// Cart total, zero for an empty cart.
    ///
    /// # Errors
    ///
    /// See [`CartStore::cart_total`].
    pub fn cart_total(&self) -> Result<Price, CartError> {
        self.read(CartStore::cart_total)
    }

    /// Summarise the cart.
    ///
    /// # Errors
    ///
    /// See [`CartStore::summary`].
    pub fn summary(&self) -> Result<CartSummary, CartError> {
        self.read(CartStore::summary)
    }

    /// Sum of line quantities.
    pub fn item_count(&self) -> u64 {
        self.read(CartStore::item_count)
    }

    /// Render an amount with the cart's price format.
    pub fn format_price(&self, amount: &Price) -> String {
        self.read(|cart| cart.format_price(amount))
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.read(CartStore::is_empty)
    }

    fn notify(&self, event: &CartEvent) {
        let observers = self.store.borrow().dispatch_list();

        notify_all(&observers, event);
    }
}

impl From<CartStore> for CartHandle {
    fn from(store: CartStore) -> Self {
        Self::new(store)
    }
}

/// Scope that presentation components ask for their cart.
///
/// A context without a cart is a wiring mistake; asking it for one fails with
/// [`CartError::Uninitialized`] instead of handing out an empty cart.
#[derive(Debug, Clone, Default)]
pub struct CartContext {
    cart: Option<CartHandle>,
}

impl CartContext {
    /// Create a context with no cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context providing the given cart.
    pub fn provide(cart: CartHandle) -> Self {
        Self { cart: Some(cart) }
    }

    /// Whether a cart was provided.
    pub fn is_initialized(&self) -> bool {
        self.cart.is_some()
    }

    /// Get the provided cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Uninitialized`] if no cart was provided.
    pub fn cart(&self) -> Result<CartHandle, CartError> {
        self.cart.clone().ok_or(CartError::Uninitialized)
    }
}
