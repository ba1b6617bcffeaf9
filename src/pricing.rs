//! Pricing

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::carts::CartLine;

/// Errors that can occur while totalling cart lines.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A line total does not fit into signed minor units.
    #[error("line total of {0} minor units is too large")]
    Overflow(u64),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Total of a single line (effective unit price × quantity).
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] when the total cannot be represented as money.
pub fn line_total(
    line: &CartLine,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    money(line.line_total(), currency)
}

/// `minor` units of `currency`, such as a product's effective price.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] when `minor` does not fit into signed minor units.
pub fn money(minor: u64, currency: &'static Currency) -> Result<Money<'static, Currency>, PricingError> {
    let Ok(amount) = i64::try_from(minor) else {
        return Err(PricingError::Overflow(minor));
    };

    Ok(Money::from_minor(amount, currency))
}

/// Sum of line totals; zero in `currency` when there are no lines.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: a line total cannot be represented as money.
/// - [`PricingError::Money`]: wrapped money arithmetic error.
pub fn total_of<'l>(
    lines: impl IntoIterator<Item = &'l CartLine>,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    lines
        .into_iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            Ok(acc.add(line_total(line, currency)?)?)
        })
}
