//! Outcomes of quantity increases.

use kart::{carts::Cart, products::ProductId};

/// Where a stock shortfall was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortfallOrigin {
    /// Rejected before any request, from the last known stock.
    Local,

    /// Reported by the server (`shouldAdjust`).
    Server,
}

/// The requested units exceed what is available.
///
/// Resolved by accepting a clamped request of [`retry_quantity`](Self::retry_quantity)
/// units or by abandoning the operation; never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockShortfall {
    /// Product whose stock ran short
    pub product_id: ProductId,

    /// Units that were requested to be added
    pub requested: u32,

    /// Available quantity as known locally (stock) or reported by the server
    pub available: u32,

    /// Units to add if the user accepts the adjustment
    pub retry_quantity: u32,

    /// Server's explanation, when the server reported the shortfall
    pub message: Option<String>,

    /// Whether the shortfall was detected locally or by the server
    pub origin: ShortfallOrigin,
}

/// The increase crosses the large-quantity threshold and awaits the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LargeQuantityPrompt {
    /// Product about to cross the threshold
    pub product_id: ProductId,

    /// Units that were requested to be added
    pub delta: u32,

    /// Quantity the line would hold afterwards
    pub prospective: u32,

    /// Threshold that was crossed
    pub threshold: u32,
}

/// Result of an increase that did not fail outright.
#[derive(Debug, Clone, PartialEq)]
pub enum IncreaseOutcome {
    /// The server applied the increase; `cart` now is the local cart.
    Applied {
        /// Cart returned by the server
        cart: Cart,

        /// Server flagged the resulting quantity as unusually large
        large_quantity: bool,
    },

    /// Not enough stock; see [`StockShortfall`].
    StockExceeded(StockShortfall),

    /// Suspended until the user confirms; see [`LargeQuantityPrompt`].
    NeedsConfirmation(LargeQuantityPrompt),
}

impl IncreaseOutcome {
    /// Whether the cart changed.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}
