//! Cart synchronization engine.

use std::{
    fmt,
    future::Future,
    sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError},
    time::Duration,
};

use kart::{
    carts::Cart,
    confirmations::LargeQuantityConfirmations,
    products::{Product, ProductId},
    rules::{IncreaseDecision, evaluate_increase},
};
use rustc_hash::FxHashMap;
use tokio::{
    sync::{Mutex, watch},
    time::timeout,
};
use tracing::{error, info, instrument, warn};

use crate::{
    api::{AddToCartResponse, ApiError, CartsApi},
    auth::AuthToken,
    sync::{
        CartSyncError,
        outcomes::{IncreaseOutcome, LargeQuantityPrompt, ShortfallOrigin, StockShortfall},
        state::{CartAction, CartState, SyncFailure},
    },
};

/// Client-side owner of the cart.
///
/// Contract:
///
/// - After every successful response the local cart is exactly the cart the
///   server returned; nothing from the previous snapshot is merged in.
/// - A failed request leaves the previous snapshot untouched and records a
///   [`SyncFailure`].
/// - Requests are serialized: a mutation issued while another one is waiting
///   on the server starts only after the first has completed.
/// - Every request is bounded by the configured timeout.
///
/// Observers follow the state through [`subscribe`](Self::subscribe).
pub struct CartSyncEngine {
    api: Arc<dyn CartsApi>,
    request_timeout: Duration,
    mutations: Mutex<()>,
    state: watch::Sender<CartState>,
    stock: StdMutex<FxHashMap<ProductId, u32>>,
}

impl fmt::Debug for CartSyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartSyncEngine")
            .field("request_timeout", &self.request_timeout)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl CartSyncEngine {
    /// An engine holding an empty cart until the first fetch.
    #[must_use]
    pub fn new(api: Arc<dyn CartsApi>, request_timeout: Duration) -> Self {
        Self::with_cart(api, request_timeout, Cart::empty())
    }

    /// An engine starting from a previously fetched cart.
    #[must_use]
    pub fn with_cart(api: Arc<dyn CartsApi>, request_timeout: Duration, cart: Cart) -> Self {
        let (state, _) = watch::channel(CartState {
            cart,
            ..CartState::default()
        });

        let engine = Self {
            api,
            request_timeout,
            mutations: Mutex::new(()),
            state,
            stock: StdMutex::new(FxHashMap::default()),
        };

        engine.with_current_cart(|cart| {
            engine.remember_products(cart.lines().iter().map(|line| &line.product));
        });

        engine
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> CartState {
        self.state.borrow().clone()
    }

    /// Current cart.
    pub fn cart(&self) -> Cart {
        self.state.borrow().cart.clone()
    }

    /// Run `f` against the current cart without cloning it.
    ///
    /// `f` must not call back into the engine's mutating operations.
    pub fn with_current_cart<R>(&self, f: impl FnOnce(&Cart) -> R) -> R {
        f(&self.state.borrow().cart)
    }

    /// Feed catalog snapshots into the stock cache used by pre-flight checks.
    ///
    /// A snapshot without stock forgets the product's cached stock.
    pub fn remember_products<'p>(&self, products: impl IntoIterator<Item = &'p Product>) {
        let mut stock = self.stock_cache();

        for product in products {
            if let Some(units) = product.stock {
                stock.insert(product.id.clone(), units);
            } else {
                stock.remove(&product.id);
            }
        }
    }

    /// Last known stock of `product`, preferring the snapshot inside the cart.
    pub fn known_stock(&self, product: &ProductId) -> Option<u32> {
        let in_cart = self.with_current_cart(|cart| {
            cart.line_for_product(product)
                .and_then(|line| line.product.stock)
        });

        in_cart.or_else(|| self.stock_cache().get(product).copied())
    }

    /// Replace the local cart with the server's.
    ///
    /// # Errors
    ///
    /// Returns [`CartSyncError::AuthRequired`] without a token, or the request's
    /// failure; the previous cart is kept on failure.
    #[instrument(skip_all)]
    pub async fn fetch_cart(&self, token: Option<&AuthToken>) -> Result<Cart, CartSyncError> {
        let token = require_token(token)?;
        let _mutation = self.mutations.lock().await;

        let cart = self
            .dispatch(CartAction::Fetch, self.api.fetch_cart(token))
            .await?;

        Ok(self.replace_cart(cart))
    }

    /// Add `delta` units of `product`, after the pre-flight rules allow it.
    ///
    /// Stock shortfalls and large-quantity prompts come back as
    /// [`IncreaseOutcome`] values; nothing is sent to the server for either
    /// when they are detected locally.
    ///
    /// # Errors
    ///
    /// Returns [`CartSyncError::InvalidQuantity`] for a zero `delta`,
    /// [`CartSyncError::AuthRequired`] without a token, or the request's failure.
    #[instrument(skip_all, fields(product = %product, delta = delta))]
    pub async fn increase_quantity(
        &self,
        token: Option<&AuthToken>,
        product: &ProductId,
        delta: u32,
        confirmations: &LargeQuantityConfirmations,
    ) -> Result<IncreaseOutcome, CartSyncError> {
        let token = require_token(token)?;
        let _mutation = self.mutations.lock().await;

        self.evaluate_and_add(token, product, delta, confirmations.is_confirmed(product))
            .await
    }

    /// The user accepted a large-quantity prompt: remember it for the product
    /// and send the suspended increase.
    ///
    /// # Errors
    ///
    /// Same as [`increase_quantity`](Self::increase_quantity).
    #[instrument(skip_all, fields(product = %prompt.product_id, delta = prompt.delta))]
    pub async fn accept_large_quantity(
        &self,
        token: Option<&AuthToken>,
        prompt: &LargeQuantityPrompt,
        confirmations: &mut LargeQuantityConfirmations,
    ) -> Result<IncreaseOutcome, CartSyncError> {
        let token = require_token(token)?;

        confirmations.confirm(prompt.product_id.clone());

        info!(prospective = prompt.prospective, "large quantity confirmed");

        let _mutation = self.mutations.lock().await;

        self.evaluate_and_add(token, &prompt.product_id, prompt.delta, true)
            .await
    }

    /// The user accepted a stock adjustment: request the clamped quantity once.
    ///
    /// A server-reported shortfall is re-issued as is. A locally detected one
    /// goes through the pre-flight rules again, so it may still prompt for a
    /// large quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartSyncError::NothingToAdjust`] when no units can be added,
    /// [`CartSyncError::AuthRequired`] without a token, or the request's failure.
    #[instrument(skip_all, fields(product = %shortfall.product_id, quantity = shortfall.retry_quantity))]
    pub async fn accept_stock_adjustment(
        &self,
        token: Option<&AuthToken>,
        shortfall: &StockShortfall,
        confirmations: &LargeQuantityConfirmations,
    ) -> Result<IncreaseOutcome, CartSyncError> {
        let token = require_token(token)?;

        if shortfall.retry_quantity == 0 {
            return Err(CartSyncError::NothingToAdjust);
        }

        let _mutation = self.mutations.lock().await;

        match shortfall.origin {
            ShortfallOrigin::Server => {
                self.add(token, &shortfall.product_id, shortfall.retry_quantity)
                    .await
            }
            ShortfallOrigin::Local => {
                self.evaluate_and_add(
                    token,
                    &shortfall.product_id,
                    shortfall.retry_quantity,
                    confirmations.is_confirmed(&shortfall.product_id),
                )
                .await
            }
        }
    }

    /// Remove one unit of `product`; the server drops the line at zero.
    ///
    /// # Errors
    ///
    /// Returns [`CartSyncError::AuthRequired`] without a token, or the request's
    /// failure; the previous cart is kept on failure.
    #[instrument(skip_all, fields(product = %product))]
    pub async fn decrease_quantity(
        &self,
        token: Option<&AuthToken>,
        product: &ProductId,
    ) -> Result<Cart, CartSyncError> {
        let token = require_token(token)?;
        let _mutation = self.mutations.lock().await;

        let cart = self
            .dispatch(
                CartAction::Decrease(product.clone()),
                self.api.decrease_quantity(token, product),
            )
            .await?;

        Ok(self.replace_cart(cart))
    }

    /// Remove the whole line holding `product`, whatever its quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartSyncError::AuthRequired`] without a token, or the request's
    /// failure; the previous cart is kept on failure.
    #[instrument(skip_all, fields(product = %product))]
    pub async fn remove_line(
        &self,
        token: Option<&AuthToken>,
        product: &ProductId,
    ) -> Result<Cart, CartSyncError> {
        let token = require_token(token)?;
        let _mutation = self.mutations.lock().await;

        let cart = self
            .dispatch(
                CartAction::RemoveLine(product.clone()),
                self.api.remove_line(token, product),
            )
            .await?;

        Ok(self.replace_cart(cart))
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns [`CartSyncError::AuthRequired`] without a token, or the request's
    /// failure; the previous cart is kept on failure.
    #[instrument(skip_all)]
    pub async fn clear_cart(&self, token: Option<&AuthToken>) -> Result<Cart, CartSyncError> {
        let token = require_token(token)?;
        let _mutation = self.mutations.lock().await;

        let cart = self
            .dispatch(CartAction::Clear, self.api.clear_cart(token))
            .await?;

        Ok(self.replace_cart(cart))
    }

    /// Callers hold the mutation guard.
    async fn evaluate_and_add(
        &self,
        token: &AuthToken,
        product: &ProductId,
        delta: u32,
        confirmed: bool,
    ) -> Result<IncreaseOutcome, CartSyncError> {
        let current = self.with_current_cart(|cart| cart.quantity_of(product));
        let stock = self.known_stock(product);

        match evaluate_increase(current, delta, stock, confirmed)? {
            IncreaseDecision::Dispatch { .. } => self.add(token, product, delta).await,
            IncreaseDecision::ExceedsStock { prospective, stock } => {
                warn!(current, prospective, stock, "increase exceeds known stock");

                Ok(IncreaseOutcome::StockExceeded(StockShortfall {
                    product_id: product.clone(),
                    requested: delta,
                    available: stock,
                    retry_quantity: stock.saturating_sub(current),
                    message: None,
                    origin: ShortfallOrigin::Local,
                }))
            }
            IncreaseDecision::ConfirmLargeQuantity {
                prospective,
                threshold,
            } => {
                warn!(prospective, threshold, "increase needs large-quantity confirmation");

                Ok(IncreaseOutcome::NeedsConfirmation(LargeQuantityPrompt {
                    product_id: product.clone(),
                    delta,
                    prospective,
                    threshold,
                }))
            }
        }
    }

    /// Callers hold the mutation guard.
    async fn add(
        &self,
        token: &AuthToken,
        product: &ProductId,
        quantity: u32,
    ) -> Result<IncreaseOutcome, CartSyncError> {
        let response = self
            .dispatch(
                CartAction::Increase(product.clone()),
                self.api.add_to_cart(token, product, quantity),
            )
            .await?;

        match response {
            AddToCartResponse::Added {
                cart,
                large_quantity,
            } => Ok(IncreaseOutcome::Applied {
                cart: self.replace_cart(cart),
                large_quantity,
            }),
            AddToCartResponse::ShouldAdjust {
                available_quantity,
                message,
            } => {
                warn!(
                    requested = quantity,
                    available = available_quantity,
                    "server reported insufficient stock"
                );

                Ok(IncreaseOutcome::StockExceeded(StockShortfall {
                    product_id: product.clone(),
                    requested: quantity,
                    available: available_quantity,
                    retry_quantity: available_quantity,
                    message: Some(message),
                    origin: ShortfallOrigin::Server,
                }))
            }
        }
    }

    /// Run one request with the in-flight marker set and the timeout applied.
    async fn dispatch<T, F>(&self, action: CartAction, request: F) -> Result<T, CartSyncError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let in_flight = InFlight::start(&self.state, action.clone());

        let result = match timeout(self.request_timeout, request).await {
            Ok(response) => response.map_err(CartSyncError::from),
            Err(_elapsed) => Err(CartSyncError::TimedOut(self.request_timeout)),
        };

        drop(in_flight);

        if let Err(error) = &result {
            error!(?action, retryable = error.is_retryable(), "cart request failed: {error}");

            self.state.send_modify(|state| {
                state.last_failure = Some(SyncFailure::new(action, error));
            });
        }

        result
    }

    fn replace_cart(&self, cart: Cart) -> Cart {
        self.remember_products(cart.lines().iter().map(|line| &line.product));

        let mut revision = 0;

        self.state.send_modify(|state| {
            state.cart = cart.clone();
            state.last_failure = None;
            state.revision += 1;
            revision = state.revision;
        });

        info!(lines = cart.len(), revision, "cart replaced");

        cart
    }

    fn stock_cache(&self) -> MutexGuard<'_, FxHashMap<ProductId, u32>> {
        self.stock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks an action as in flight until dropped, including when the caller
/// abandons the request future.
struct InFlight<'a> {
    state: &'a watch::Sender<CartState>,
}

impl<'a> InFlight<'a> {
    fn start(state: &'a watch::Sender<CartState>, action: CartAction) -> Self {
        state.send_modify(|state| state.in_flight = Some(action));

        Self { state }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|state| state.in_flight = None);
    }
}

fn require_token(token: Option<&AuthToken>) -> Result<&AuthToken, CartSyncError> {
    token.ok_or_else(|| {
        warn!("cart operation attempted without a token");

        CartSyncError::AuthRequired
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use kart::{
        carts::CartLineId,
        fixtures::{cart, line, product},
        rules::RuleError,
    };
    use testresult::TestResult;

    use crate::{
        api::MockCartsApi,
        test::{FakeCartsApi, token},
    };

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(15);

    fn engine(api: MockCartsApi, cart: Cart) -> CartSyncEngine {
        CartSyncEngine::with_cart(Arc::new(api), TIMEOUT, cart)
    }

    fn tea(quantity: u32, stock: u32) -> Cart {
        cart(vec![line("tea", 100, 0, quantity, Some(stock))])
    }

    fn added(cart: Cart) -> Result<AddToCartResponse, ApiError> {
        Ok(AddToCartResponse::Added {
            cart,
            large_quantity: false,
        })
    }

    #[tokio::test]
    async fn fetch_replaces_cart() -> TestResult {
        let mut api = MockCartsApi::new();
        let server_cart = tea(2, 10);
        let returned = server_cart.clone();

        api.expect_fetch_cart()
            .once()
            .return_once(move |_| Ok(returned));

        let engine = engine(api, Cart::empty());

        let cart = engine.fetch_cart(Some(&token())).await?;

        assert_eq!(cart, server_cart);
        assert_eq!(engine.cart(), server_cart);
        assert_eq!(engine.snapshot().revision, 1);

        Ok(())
    }

    #[tokio::test]
    async fn fetch_failure_keeps_cart_and_records_failure() {
        let mut api = MockCartsApi::new();

        api.expect_fetch_cart()
            .once()
            .return_once(|_| Err(ApiError::Transport("connection refused".into())));

        let before = tea(2, 10);
        let engine = engine(api, before.clone());

        let result = engine.fetch_cart(Some(&token())).await;

        assert!(
            matches!(result, Err(CartSyncError::Network(_))),
            "expected Network, got {result:?}"
        );

        let state = engine.snapshot();

        assert_eq!(state.cart, before);
        assert!(
            state
                .last_failure
                .is_some_and(|failure| failure.retryable && failure.action == CartAction::Fetch)
        );
    }

    #[tokio::test]
    async fn missing_token_never_reaches_the_server() {
        let mut api = MockCartsApi::new();

        api.expect_fetch_cart().never();
        api.expect_add_to_cart().never();
        api.expect_clear_cart().never();

        let engine = engine(api, tea(1, 10));

        assert!(matches!(
            engine.fetch_cart(None).await,
            Err(CartSyncError::AuthRequired)
        ));
        assert!(matches!(
            engine
                .increase_quantity(None, &ProductId::new("tea"), 1, &LargeQuantityConfirmations::new())
                .await,
            Err(CartSyncError::AuthRequired)
        ));
        assert!(matches!(
            engine.clear_cart(None).await,
            Err(CartSyncError::AuthRequired)
        ));
    }

    #[tokio::test]
    async fn increase_at_stock_is_rejected_without_a_request() -> TestResult {
        let mut api = MockCartsApi::new();

        api.expect_add_to_cart().never();

        let engine = engine(api, tea(3, 3));

        let outcome = engine
            .increase_quantity(
                Some(&token()),
                &ProductId::new("tea"),
                1,
                &LargeQuantityConfirmations::new(),
            )
            .await?;

        match outcome {
            IncreaseOutcome::StockExceeded(shortfall) => {
                assert_eq!(shortfall.available, 3);
                assert_eq!(shortfall.retry_quantity, 0);
                assert_eq!(shortfall.origin, ShortfallOrigin::Local);
            }
            other => panic!("expected StockExceeded, got {other:?}"),
        }

        assert_eq!(engine.snapshot().revision, 0);

        Ok(())
    }

    #[tokio::test]
    async fn catalog_stock_is_used_for_products_not_in_the_cart() -> TestResult {
        let mut api = MockCartsApi::new();

        api.expect_add_to_cart().never();

        let engine = engine(api, Cart::empty());

        engine.remember_products([&product("rice", 25_000, 0, Some(2))]);

        let outcome = engine
            .increase_quantity(
                Some(&token()),
                &ProductId::new("rice"),
                3,
                &LargeQuantityConfirmations::new(),
            )
            .await?;

        assert!(
            matches!(
                &outcome,
                IncreaseOutcome::StockExceeded(StockShortfall {
                    available: 2,
                    retry_quantity: 2,
                    ..
                })
            ),
            "expected local shortfall, got {outcome:?}"
        );

        Ok(())
    }

    #[test]
    fn snapshot_without_stock_forgets_cached_stock() {
        let engine = engine(MockCartsApi::new(), Cart::empty());
        let rice = ProductId::new("rice");

        engine.remember_products([&product("rice", 25_000, 0, Some(2))]);
        assert_eq!(engine.known_stock(&rice), Some(2));

        engine.remember_products([&product("rice", 25_000, 0, None)]);
        assert_eq!(engine.known_stock(&rice), None);
    }

    #[tokio::test]
    async fn zero_delta_is_invalid() {
        let mut api = MockCartsApi::new();

        api.expect_add_to_cart().never();

        let engine = engine(api, tea(1, 10));

        let result = engine
            .increase_quantity(
                Some(&token()),
                &ProductId::new("tea"),
                0,
                &LargeQuantityConfirmations::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(CartSyncError::InvalidQuantity(RuleError::ZeroDelta))
        ));
    }

    #[tokio::test]
    async fn large_quantity_prompts_once_per_product_per_session() -> TestResult {
        let mut api = MockCartsApi::new();

        api.expect_add_to_cart()
            .once()
            .withf(|_, product, quantity| product.as_str() == "tea" && *quantity == 1)
            .return_once(|_, _, _| added(tea(15, 100)));

        let engine = engine(api, tea(14, 100));
        let tea_id = ProductId::new("tea");
        let confirmations = LargeQuantityConfirmations::new();

        // 14 -> 15 goes straight through.
        let outcome = engine
            .increase_quantity(Some(&token()), &tea_id, 1, &confirmations)
            .await?;

        assert!(outcome.is_applied());

        // 15 -> 16 needs a confirmation.
        let outcome = engine
            .increase_quantity(Some(&token()), &tea_id, 1, &confirmations)
            .await?;

        let IncreaseOutcome::NeedsConfirmation(prompt) = outcome else {
            panic!("expected NeedsConfirmation, got {outcome:?}");
        };

        assert_eq!(prompt.prospective, 16);
        assert_eq!(engine.cart(), tea(15, 100));
        assert!(confirmations.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn accepted_large_quantity_is_not_prompted_again() -> TestResult {
        let mut api = MockCartsApi::new();

        api.expect_add_to_cart()
            .once()
            .withf(|_, _, quantity| *quantity == 1)
            .return_once(|_, _, _| added(tea(16, 100)));
        api.expect_add_to_cart()
            .once()
            .withf(|_, _, quantity| *quantity == 1)
            .return_once(|_, _, _| added(tea(17, 100)));

        let engine = engine(api, tea(15, 100));
        let tea_id = ProductId::new("tea");
        let mut confirmations = LargeQuantityConfirmations::new();

        let IncreaseOutcome::NeedsConfirmation(prompt) = engine
            .increase_quantity(Some(&token()), &tea_id, 1, &confirmations)
            .await?
        else {
            panic!("expected a prompt at 16 units");
        };

        let outcome = engine
            .accept_large_quantity(Some(&token()), &prompt, &mut confirmations)
            .await?;

        assert!(outcome.is_applied());
        assert!(confirmations.is_confirmed(&tea_id));

        let outcome = engine
            .increase_quantity(Some(&token()), &tea_id, 1, &confirmations)
            .await?;

        assert!(outcome.is_applied(), "expected no prompt, got {outcome:?}");
        assert_eq!(engine.cart().quantity_of(&tea_id), 17);

        // A new session starts without confirmations.
        confirmations.reset();

        let outcome = engine
            .increase_quantity(Some(&token()), &tea_id, 1, &confirmations)
            .await?;

        assert!(matches!(outcome, IncreaseOutcome::NeedsConfirmation(_)));

        Ok(())
    }

    #[tokio::test]
    async fn server_shortfall_is_reissued_once_with_the_clamped_quantity() -> TestResult {
        let mut api = MockCartsApi::new();

        api.expect_add_to_cart()
            .once()
            .withf(|_, _, quantity| *quantity == 8)
            .return_once(|_, _, _| {
                Ok(AddToCartResponse::ShouldAdjust {
                    available_quantity: 5,
                    message: "Chỉ còn 5 sản phẩm".to_string(),
                })
            });
        api.expect_add_to_cart()
            .once()
            .withf(|_, _, quantity| *quantity == 5)
            .return_once(|_, _, _| added(cart(vec![line("rice", 100, 0, 5, None)])));

        let engine = engine(api, Cart::empty());
        let rice = ProductId::new("rice");
        let confirmations = LargeQuantityConfirmations::new();

        let IncreaseOutcome::StockExceeded(shortfall) = engine
            .increase_quantity(Some(&token()), &rice, 8, &confirmations)
            .await?
        else {
            panic!("expected a server shortfall");
        };

        assert_eq!(shortfall.origin, ShortfallOrigin::Server);
        assert_eq!(shortfall.requested, 8);
        assert_eq!(shortfall.available, 5);
        assert_eq!(shortfall.message.as_deref(), Some("Chỉ còn 5 sản phẩm"));
        assert!(engine.cart().is_empty(), "shortfall must not touch the cart");

        let outcome = engine
            .accept_stock_adjustment(Some(&token()), &shortfall, &confirmations)
            .await?;

        assert!(outcome.is_applied());
        assert_eq!(engine.cart().quantity_of(&rice), 5);

        Ok(())
    }

    #[tokio::test]
    async fn accepting_an_empty_adjustment_is_an_error() {
        let mut api = MockCartsApi::new();

        api.expect_add_to_cart().never();

        let engine = engine(api, tea(3, 3));

        let shortfall = StockShortfall {
            product_id: ProductId::new("tea"),
            requested: 1,
            available: 3,
            retry_quantity: 0,
            message: None,
            origin: ShortfallOrigin::Local,
        };

        let result = engine
            .accept_stock_adjustment(Some(&token()), &shortfall, &LargeQuantityConfirmations::new())
            .await;

        assert!(matches!(result, Err(CartSyncError::NothingToAdjust)));
    }

    #[tokio::test]
    async fn mutation_response_replaces_the_whole_cart() -> TestResult {
        let mut api = MockCartsApi::new();

        let before = cart(vec![
            line("tea", 100, 0, 2, Some(10)),
            line("coffee", 50, 0, 1, Some(10)),
        ]);
        let server_cart = cart(vec![line("tea", 120, 5, 1, Some(9))]);
        let returned = server_cart.clone();

        api.expect_decrease_quantity()
            .once()
            .withf(|_, product| product.as_str() == "tea")
            .return_once(move |_, _| Ok(returned));

        let engine = engine(api, before);

        engine
            .decrease_quantity(Some(&token()), &ProductId::new("tea"))
            .await?;

        assert_eq!(engine.cart(), server_cart);
        assert!(engine.cart().line(&CartLineId::new("line-coffee")).is_none());
        assert_eq!(engine.known_stock(&ProductId::new("tea")), Some(9));

        Ok(())
    }

    #[tokio::test]
    async fn remove_line_is_distinct_from_decrease() -> TestResult {
        let mut api = MockCartsApi::new();

        api.expect_decrease_quantity().never();
        api.expect_remove_line()
            .once()
            .withf(|_, product| product.as_str() == "tea")
            .return_once(|_, _| Ok(Cart::empty()));

        let engine = engine(api, tea(7, 10));

        let cart = engine
            .remove_line(Some(&token()), &ProductId::new("tea"))
            .await?;

        assert!(cart.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn clear_failure_preserves_cart() {
        let mut api = MockCartsApi::new();

        api.expect_clear_cart()
            .once()
            .return_once(|_| Err(ApiError::Transport("network unreachable".into())));

        let before = cart(vec![
            line("tea", 100, 0, 2, Some(10)),
            line("coffee", 50, 0, 1, Some(10)),
        ]);
        let engine = engine(api, before.clone());

        let result = engine.clear_cart(Some(&token())).await;

        assert!(result.as_ref().is_err_and(CartSyncError::is_retryable));
        assert_eq!(engine.cart(), before);
        assert_eq!(engine.snapshot().revision, 0);
        assert_eq!(engine.snapshot().in_flight, None);
    }

    #[tokio::test]
    async fn clear_success_empties_cart_and_clears_failure() -> TestResult {
        let mut api = MockCartsApi::new();

        api.expect_fetch_cart()
            .once()
            .return_once(|_| Err(ApiError::Timeout));
        api.expect_clear_cart()
            .once()
            .return_once(|_| Ok(Cart::empty()));

        let engine = engine(api, tea(2, 10));

        assert!(engine.fetch_cart(Some(&token())).await.is_err());
        assert!(engine.snapshot().last_failure.is_some());

        engine.clear_cart(Some(&token())).await?;

        let state = engine.snapshot();

        assert!(state.cart.is_empty());
        assert!(state.last_failure.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn server_rejection_is_not_retryable() {
        let mut api = MockCartsApi::new();

        api.expect_decrease_quantity().once().return_once(|_, _| {
            Err(ApiError::Rejected {
                status: 404,
                message: "Sản phẩm không có trong giỏ hàng".to_string(),
            })
        });

        let engine = engine(api, tea(1, 10));

        let result = engine
            .decrease_quantity(Some(&token()), &ProductId::new("tea"))
            .await;

        match result {
            Err(error @ CartSyncError::Rejected { .. }) => assert!(!error.is_retryable()),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn mutations_are_serialized() -> TestResult {
        let api = Arc::new(FakeCartsApi::new(Duration::from_millis(50)));
        let engine = CartSyncEngine::with_cart(api.clone(), TIMEOUT, tea(1, 100));
        let token = token();
        let tea_id = ProductId::new("tea");
        let confirmations = LargeQuantityConfirmations::new();

        let (first, second, third) = tokio::join!(
            engine.increase_quantity(Some(&token), &tea_id, 1, &confirmations),
            engine.increase_quantity(Some(&token), &tea_id, 1, &confirmations),
            engine.decrease_quantity(Some(&token), &tea_id),
        );

        first?;
        second?;
        third?;

        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
        assert_eq!(api.max_active.load(Ordering::SeqCst), 1);
        assert_eq!(engine.snapshot().revision, 3);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn hung_request_times_out_and_preserves_cart() {
        let api = Arc::new(FakeCartsApi::new(Duration::from_secs(600)));
        let before = tea(2, 10);
        let engine = CartSyncEngine::with_cart(api, TIMEOUT, before.clone());

        let result = engine.clear_cart(Some(&token())).await;

        match result {
            Err(error @ CartSyncError::TimedOut(_)) => assert!(error.is_retryable()),
            other => panic!("expected TimedOut, got {other:?}"),
        }

        let state = engine.snapshot();

        assert_eq!(state.cart, before);
        assert_eq!(state.in_flight, None);
        assert!(state.last_failure.is_some_and(|failure| failure.action == CartAction::Clear));
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_action_is_published() -> TestResult {
        let api = Arc::new(FakeCartsApi::new(Duration::from_millis(50)));
        let engine = Arc::new(CartSyncEngine::new(api, TIMEOUT));
        let mut states = engine.subscribe();

        let task = tokio::spawn({
            let engine = Arc::clone(&engine);

            async move { engine.fetch_cart(Some(&token())).await }
        });

        states
            .wait_for(|state| state.is_busy(&CartAction::Fetch))
            .await?;
        states
            .wait_for(|state| state.in_flight.is_none() && state.revision == 1)
            .await?;

        task.await??;

        Ok(())
    }
}
