//! Checkout

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    carts::{Cart, CartLine, CartLineId},
    pricing::{PricingError, total_of},
    selection::SelectionSet,
};

/// Errors that prevent a selection from being handed to checkout.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// No line is selected.
    #[error("no items selected for checkout")]
    NoItemsSelected,

    /// Selected lines whose product is no longer for sale.
    #[error("{} selected item(s) are no longer available", .0.len())]
    UnavailableItems(SmallVec<[CartLineId; 4]>),

    /// The subtotal could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// A frozen selection handed from cart review to the checkout stage.
///
/// Holds its own copies of the selected lines, so later cart mutations never
/// change a checkout that is already under way.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSelection {
    lines: Vec<CartLine>,
    subtotal: Money<'static, Currency>,
}

impl CheckoutSelection {
    /// Selected line identifiers, in cart order.
    pub fn line_ids(&self) -> impl Iterator<Item = &CartLineId> {
        self.lines.iter().map(|line| &line.id)
    }

    /// Snapshots of the selected lines, in cart order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Subtotal over the selected lines.
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Number of selected lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always `false` for a finalized selection; present for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Tracks the checkout selection for one cart-review session.
///
/// The orchestrator only reads carts; it never mutates them. Call
/// [`reconcile`](Self::reconcile) whenever the cart's line list changes.
#[derive(Debug, Clone)]
pub struct CheckoutOrchestrator {
    selection: SelectionSet,
    currency: &'static Currency,
}

impl CheckoutOrchestrator {
    /// A new orchestrator with an empty selection.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            selection: SelectionSet::new(),
            currency,
        }
    }

    /// A new orchestrator with every line of `cart` selected.
    pub fn for_cart(cart: &Cart, currency: &'static Currency) -> Self {
        Self {
            selection: SelectionSet::for_lines(cart.lines()),
            currency,
        }
    }

    /// Current selection.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Currency subtotals are computed in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Bring the selection in line with the cart's current lines.
    pub fn reconcile(&mut self, cart: &Cart) {
        self.selection.reconcile(cart.lines());
    }

    /// Flip one line's flag; see [`SelectionSet::toggle`].
    pub fn toggle(&mut self, line: &CartLineId) -> Option<bool> {
        self.selection.toggle(line)
    }

    /// Select or deselect every line.
    pub fn select_all(&mut self, selected: bool) {
        self.selection.set_all(selected);
    }

    /// Sum of effective price × quantity over the selected lines of `cart`.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line total cannot be represented as money.
    pub fn compute_subtotal(&self, cart: &Cart) -> Result<Money<'static, Currency>, PricingError> {
        total_of(self.selection.selected_lines(cart), self.currency)
    }

    /// Selected lines whose product is still for sale, in cart order.
    pub fn eligible_lines<'c>(&self, cart: &'c Cart) -> impl Iterator<Item = &'c CartLine> {
        self.selection
            .selected_lines(cart)
            .filter(|line| line.product.is_active())
    }

    /// Freeze the current selection of `cart` for checkout.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NoItemsSelected`]: nothing is selected.
    /// - [`CheckoutError::UnavailableItems`]: a selected line's product is suspended.
    /// - [`CheckoutError::Pricing`]: the subtotal cannot be computed.
    pub fn finalize(&self, cart: &Cart) -> Result<CheckoutSelection, CheckoutError> {
        let lines: Vec<CartLine> = self.selection.selected_lines(cart).cloned().collect();

        if lines.is_empty() {
            return Err(CheckoutError::NoItemsSelected);
        }

        let unavailable: SmallVec<[CartLineId; 4]> = lines
            .iter()
            .filter(|line| !line.product.is_active())
            .map(|line| line.id.clone())
            .collect();

        if !unavailable.is_empty() {
            return Err(CheckoutError::UnavailableItems(unavailable));
        }

        let subtotal = total_of(&lines, self.currency)?;

        Ok(CheckoutSelection { lines, subtotal })
    }
}
