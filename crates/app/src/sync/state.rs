//! Engine state published to observers.

use jiff::Timestamp;
use kart::{carts::Cart, products::ProductId};

use crate::sync::CartSyncError;

/// A cart operation, used to tell which control is busy or failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Fetching the cart
    Fetch,

    /// Adding units of a product
    Increase(ProductId),

    /// Removing one unit of a product
    Decrease(ProductId),

    /// Removing a product's whole line
    RemoveLine(ProductId),

    /// Removing every line
    Clear,
}

/// The last operation that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    /// Operation that failed
    pub action: CartAction,

    /// Error description, for logs
    pub message: String,

    /// Whether retrying may succeed
    pub retryable: bool,

    /// When the failure was recorded
    pub at: Timestamp,
}

impl SyncFailure {
    pub(crate) fn new(action: CartAction, error: &CartSyncError) -> Self {
        Self {
            action,
            message: error.to_string(),
            retryable: error.is_retryable(),
            at: Timestamp::now(),
        }
    }
}

/// Snapshot of the engine's state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    /// Last cart the server returned
    pub cart: Cart,

    /// Operation currently waiting on the server
    pub in_flight: Option<CartAction>,

    /// Most recent failure, cleared by the next successful response
    pub last_failure: Option<SyncFailure>,

    /// Number of times the cart has been replaced
    pub revision: u64,
}

impl CartState {
    /// Whether `action` is waiting on the server.
    pub fn is_busy(&self, action: &CartAction) -> bool {
        self.in_flight.as_ref() == Some(action)
    }
}
