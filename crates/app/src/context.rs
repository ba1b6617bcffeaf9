//! App Context

use std::sync::Arc;

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    api::{ApiClient, ApiError, HttpCartsApi, HttpProductsApi, ProductsApi},
    auth::AuthToken,
    config::{ClientConfig, ConfigError},
    messages::Locale,
    sync::CartSyncEngine,
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build http client")]
    Http(#[source] ApiError),
}

/// Shared services for one signed-in user.
#[derive(Clone)]
pub struct AppContext {
    pub engine: Arc<CartSyncEngine>,
    pub products: Arc<dyn ProductsApi>,
    pub token: Option<AuthToken>,
    pub currency: &'static Currency,
    pub locale: Locale,
}

impl AppContext {
    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when a configuration value is invalid or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, AppInitError> {
        let timeout = config.request_timeout()?;
        let currency = config.currency()?;

        let client = ApiClient::new(config.api.api_url.as_str(), timeout).map_err(AppInitError::Http)?;

        Ok(Self {
            engine: Arc::new(CartSyncEngine::new(
                Arc::new(HttpCartsApi::new(client.clone())),
                timeout,
            )),
            products: Arc::new(HttpProductsApi::new(client)),
            token: config.token(),
            currency,
            locale: config.locale,
        })
    }
}
