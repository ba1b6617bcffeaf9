//! One cart review screen: the shared engine plus this screen's selection
//! and large-quantity confirmations.

use std::sync::Arc;

use kart::{
    carts::{Cart, CartLine, CartLineId},
    checkout::{CheckoutError, CheckoutOrchestrator, CheckoutSelection},
    confirmations::LargeQuantityConfirmations,
    pricing::PricingError,
    products::ProductId,
    selection::SelectionSet,
};
use rusty_money::{Money, iso::Currency};
use tracing::debug;

use crate::{
    auth::AuthToken,
    sync::{CartSyncEngine, CartSyncError, IncreaseOutcome, LargeQuantityPrompt, StockShortfall},
};

/// Review session over a shared [`CartSyncEngine`].
///
/// The selection is reconciled against the engine's cart after every engine
/// call, whether it succeeded or not. Confirmations last as long as the
/// session.
#[derive(Debug)]
pub struct CartReviewSession {
    engine: Arc<CartSyncEngine>,
    token: Option<AuthToken>,
    checkout: CheckoutOrchestrator,
    confirmations: LargeQuantityConfirmations,
}

impl CartReviewSession {
    /// Start a session with every line of the engine's current cart selected.
    #[must_use]
    pub fn open(
        engine: Arc<CartSyncEngine>,
        token: Option<AuthToken>,
        currency: &'static Currency,
    ) -> Self {
        let checkout = engine.with_current_cart(|cart| CheckoutOrchestrator::for_cart(cart, currency));

        Self {
            engine,
            token,
            checkout,
            confirmations: LargeQuantityConfirmations::new(),
        }
    }

    /// Engine shared with other sessions.
    pub fn engine(&self) -> &Arc<CartSyncEngine> {
        &self.engine
    }

    /// Current selection, reconciled with the engine's cart.
    pub fn selection(&self) -> &SelectionSet {
        self.checkout.selection()
    }

    /// Large-quantity confirmations given in this session.
    pub fn confirmations(&self) -> &LargeQuantityConfirmations {
        &self.confirmations
    }

    /// Current cart, as last returned by the server.
    pub fn cart(&self) -> Cart {
        self.engine.cart()
    }

    /// Fetch the cart from the server.
    ///
    /// # Errors
    ///
    /// See [`CartSyncEngine::fetch_cart`].
    pub async fn refresh(&mut self) -> Result<Cart, CartSyncError> {
        let result = self.engine.fetch_cart(self.token.as_ref()).await;
        self.reconcile();
        result
    }

    /// Add `delta` units of `product`.
    ///
    /// # Errors
    ///
    /// See [`CartSyncEngine::increase_quantity`].
    pub async fn increase(
        &mut self,
        product: &ProductId,
        delta: u32,
    ) -> Result<IncreaseOutcome, CartSyncError> {
        let result = self
            .engine
            .increase_quantity(self.token.as_ref(), product, delta, &self.confirmations)
            .await;
        self.reconcile();
        result
    }

    /// Accept a large-quantity prompt and send the suspended increase.
    ///
    /// # Errors
    ///
    /// See [`CartSyncEngine::accept_large_quantity`].
    pub async fn accept_large_quantity(
        &mut self,
        prompt: &LargeQuantityPrompt,
    ) -> Result<IncreaseOutcome, CartSyncError> {
        let result = self
            .engine
            .accept_large_quantity(self.token.as_ref(), prompt, &mut self.confirmations)
            .await;
        self.reconcile();
        result
    }

    /// Accept a stock adjustment and request the clamped quantity.
    ///
    /// # Errors
    ///
    /// See [`CartSyncEngine::accept_stock_adjustment`].
    pub async fn accept_stock_adjustment(
        &mut self,
        shortfall: &StockShortfall,
    ) -> Result<IncreaseOutcome, CartSyncError> {
        let result = self
            .engine
            .accept_stock_adjustment(self.token.as_ref(), shortfall, &self.confirmations)
            .await;
        self.reconcile();
        result
    }

    /// Remove one unit of `product`.
    ///
    /// # Errors
    ///
    /// See [`CartSyncEngine::decrease_quantity`].
    pub async fn decrease(&mut self, product: &ProductId) -> Result<Cart, CartSyncError> {
        let result = self
            .engine
            .decrease_quantity(self.token.as_ref(), product)
            .await;
        self.reconcile();
        result
    }

    /// Remove the whole line holding `product`.
    ///
    /// # Errors
    ///
    /// See [`CartSyncEngine::remove_line`].
    pub async fn remove_line(&mut self, product: &ProductId) -> Result<Cart, CartSyncError> {
        let result = self.engine.remove_line(self.token.as_ref(), product).await;
        self.reconcile();
        result
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// See [`CartSyncEngine::clear_cart`].
    pub async fn clear(&mut self) -> Result<Cart, CartSyncError> {
        let result = self.engine.clear_cart(self.token.as_ref()).await;
        self.reconcile();
        result
    }

    /// Flip one line's selection; `None` for lines not in the cart.
    pub fn toggle(&mut self, line: &CartLineId) -> Option<bool> {
        self.checkout.toggle(line)
    }

    /// Select or deselect every line.
    pub fn select_all(&mut self, selected: bool) {
        self.checkout.select_all(selected);
    }

    /// Subtotal of the selected lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the subtotal overflows.
    pub fn subtotal(&self) -> Result<Money<'static, Currency>, PricingError> {
        self.engine
            .with_current_cart(|cart| self.checkout.compute_subtotal(cart))
    }

    /// Selected lines whose product can be ordered.
    pub fn eligible_lines(&self) -> Vec<CartLine> {
        self.engine.with_current_cart(|cart| {
            self.checkout.eligible_lines(cart).cloned().collect()
        })
    }

    /// Freeze the selection for the order flow.
    ///
    /// # Errors
    ///
    /// See [`CheckoutOrchestrator::finalize`].
    pub fn finalize_for_checkout(&self) -> Result<CheckoutSelection, CheckoutError> {
        self.engine
            .with_current_cart(|cart| self.checkout.finalize(cart))
    }

    fn reconcile(&mut self) {
        let checkout = &mut self.checkout;

        self.engine.with_current_cart(|cart| checkout.reconcile(cart));

        debug!(
            lines = checkout.selection().len(),
            selected = checkout.selection().selected_count(),
            "selection reconciled"
        );
    }
}
