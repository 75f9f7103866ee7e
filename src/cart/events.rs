//! Cart change notifications.
//!
//! Presentation code subscribes a [`CartObserver`] to keep list views and
//! badges in sync with cart mutations.

use std::{
    cell::RefCell,
    fmt::{Debug, Formatter, Result as FmtResult},
    rc::Rc,
};

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;
use tracing::warn;

use crate::products::ProductId;

new_key_type! {
    /// Subscription Key
    pub struct SubscriptionKey;
}

/// A completed cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// A product was added or its quantity was merged.
    Added {
        /// Product added
        product_id: ProductId,
        /// Quantity added by this call
        added: u32,
        /// Quantity of the line after the add
        quantity: u32,
    },

    /// A line's quantity was overwritten.
    QuantityChanged {
        /// Product updated
        product_id: ProductId,
        /// New quantity
        quantity: u32,
    },

    /// A line was removed.
    Removed {
        /// Product removed
        product_id: ProductId,
    },

    /// Every line was removed.
    Cleared {
        /// Number of lines the cart held before clearing
        lines: usize,
    },
}

/// Receives cart events after each mutation.
pub trait CartObserver {
    /// Called once per completed mutation, in mutation order.
    fn on_cart_event(&mut self, event: &CartEvent);
}

impl<F> CartObserver for F
where
    F: FnMut(&CartEvent),
{
    fn on_cart_event(&mut self, event: &CartEvent) {
        self(event);
    }
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CartObserver for NoopObserver {
    fn on_cart_event(&mut self, _event: &CartEvent) {}
}

pub(crate) type SharedObserver = Rc<RefCell<dyn CartObserver>>;

/// Observers dispatched for one event.
pub(crate) type Dispatch = SmallVec<[SharedObserver; 4]>;

/// Registered observers.
#[derive(Default)]
pub(crate) struct Subscribers {
    observers: SlotMap<SubscriptionKey, SharedObserver>,
}

impl Subscribers {
    pub(crate) fn insert(&mut self, observer: impl CartObserver + 'static) -> SubscriptionKey {
        let observer: SharedObserver = Rc::new(RefCell::new(observer));

        self.observers.insert(observer)
    }

    pub(crate) fn remove(&mut self, key: SubscriptionKey) -> bool {
        self.observers.remove(key).is_some()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    /// Clone the current observers so they can be notified without holding
    /// a borrow of the cart.
    pub(crate) fn dispatch_list(&self) -> Dispatch {
        self.observers.values().cloned().collect()
    }

    pub(crate) fn notify(&self, event: &CartEvent) {
        notify_all(&self.dispatch_list(), event);
    }
}

impl Debug for Subscribers {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Subscribers")
            .field("observers", &self.observers.len())
            .finish()
    }
}

pub(crate) fn notify_all(observers: &[SharedObserver], event: &CartEvent) {
    for observer in observers {
        match observer.try_borrow_mut() {
            Ok(mut observer) => observer.on_cart_event(event),
            Err(_) => warn!(?event, "skipping reentrant cart notification"),
        }
    }
}
