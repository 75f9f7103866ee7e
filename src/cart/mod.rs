//! Cart

pub mod errors;
pub mod events;
pub mod handle;
pub mod lines;
pub mod receipt;
pub mod store;

pub use errors::CartError;
pub use events::{CartEvent, CartObserver, NoopObserver, SubscriptionKey};
pub use handle::{CartContext, CartHandle};
pub use lines::{CartLine, NewCartLine, UNKNOWN_PRODUCT};
pub use receipt::{CartReceipt, ReceiptError};
pub use store::{CartStore, CartSummary, ResolvedLine};
