//! Quantity Rules

use thiserror::Error;

/// Quantity above which the user must confirm the purchase.
pub const LARGE_QUANTITY_THRESHOLD: u32 = 15;

/// Errors from evaluating a quantity increase.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RuleError {
    /// The increase was zero units.
    #[error("quantity increase must be at least one unit")]
    ZeroDelta,

    /// The resulting quantity does not fit in a `u32`.
    #[error("quantity {current} + {delta} is out of range")]
    Overflow {
        /// Quantity already in the cart
        current: u32,

        /// Requested increase
        delta: u32,
    },
}

/// What to do with a requested quantity increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncreaseDecision {
    /// Send the increase to the server.
    Dispatch {
        /// Quantity after the increase
        prospective: u32,
    },

    /// The increase would exceed the known stock; do not send it.
    ExceedsStock {
        /// Quantity after the increase
        prospective: u32,

        /// Units in stock
        stock: u32,
    },

    /// The increase crosses [`LARGE_QUANTITY_THRESHOLD`] and needs a confirmation first.
    ConfirmLargeQuantity {
        /// Quantity after the increase
        prospective: u32,

        /// Threshold that was crossed
        threshold: u32,
    },
}

/// Evaluate adding `delta` units to a line currently holding `current` units.
///
/// `stock` is the last known stock of the product; `None` skips the stock
/// check and leaves it to the server. `confirmed` is whether the user already
/// accepted a large quantity of this product in the current session. The
/// stock check runs before the confirmation check, so a request that cannot
/// succeed never prompts.
///
/// # Errors
///
/// - [`RuleError::ZeroDelta`]: `delta` is zero.
/// - [`RuleError::Overflow`]: the resulting quantity is out of range.
pub fn evaluate_increase(
    current: u32,
    delta: u32,
    stock: Option<u32>,
    confirmed: bool,
) -> Result<IncreaseDecision, RuleError> {
    if delta == 0 {
        return Err(RuleError::ZeroDelta);
    }

    let prospective = current
        .checked_add(delta)
        .ok_or(RuleError::Overflow { current, delta })?;

    if let Some(stock) = stock.filter(|stock| prospective > *stock) {
        return Ok(IncreaseDecision::ExceedsStock { prospective, stock });
    }

    if prospective > LARGE_QUANTITY_THRESHOLD && !confirmed {
        return Ok(IncreaseDecision::ConfirmLargeQuantity {
            prospective,
            threshold: LARGE_QUANTITY_THRESHOLD,
        });
    }

    Ok(IncreaseDecision::Dispatch { prospective })
}
