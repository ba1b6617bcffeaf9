//! Test Helpers

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use kart::{carts::Cart, products::ProductId};

use crate::{
    api::{AddToCartResponse, ApiError, CartsApi},
    auth::AuthToken,
};

pub(crate) const TEST_TOKEN: &str = "test-session-token";

pub(crate) fn token() -> AuthToken {
    AuthToken::parse(TEST_TOKEN).unwrap_or_else(|error| panic!("test token must parse: {error}"))
}

/// [`CartsApi`] that answers every call with an empty cart after `delay`,
/// counting how many calls overlap.
#[derive(Debug, Default)]
pub(crate) struct FakeCartsApi {
    delay: Duration,
    active: AtomicUsize,
    pub(crate) max_active: AtomicUsize,
    pub(crate) calls: AtomicUsize,
}

impl FakeCartsApi {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    async fn respond(&self) -> Cart {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.active.fetch_sub(1, Ordering::SeqCst);

        Cart::empty()
    }
}

#[async_trait]
impl CartsApi for FakeCartsApi {
    async fn fetch_cart(&self, _token: &AuthToken) -> Result<Cart, ApiError> {
        Ok(self.respond().await)
    }

    async fn add_to_cart(
        &self,
        _token: &AuthToken,
        _product: &ProductId,
        _quantity: u32,
    ) -> Result<AddToCartResponse, ApiError> {
        Ok(AddToCartResponse::Added {
            cart: self.respond().await,
            large_quantity: false,
        })
    }

    async fn decrease_quantity(
        &self,
        _token: &AuthToken,
        _product: &ProductId,
    ) -> Result<Cart, ApiError> {
        Ok(self.respond().await)
    }

    async fn remove_line(&self, _token: &AuthToken, _product: &ProductId) -> Result<Cart, ApiError> {
        Ok(self.respond().await)
    }

    async fn clear_cart(&self, _token: &AuthToken) -> Result<Cart, ApiError> {
        Ok(self.respond().await)
    }
}
