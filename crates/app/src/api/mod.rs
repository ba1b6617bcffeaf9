//! Remote shop API clients.

use std::{error::Error as StdError, time::Duration};

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

use crate::auth::AuthToken;

pub mod carts;
pub mod products;

pub use carts::{AddToCartResponse, CartsApi, HttpCartsApi, MockCartsApi};
pub use products::{HttpProductsApi, MockProductsApi, ProductsApi};

/// Boxed transport failure.
pub type TransportError = Box<dyn StdError + Send + Sync>;

/// Errors that can occur when talking to the remote shop API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, DNS, TLS…).
    #[error("http transport error: {0}")]
    Transport(#[source] TransportError),

    /// The HTTP client gave up waiting for a response.
    #[error("request timed out")]
    Timeout,

    /// The server refused the credentials (401/403).
    #[error("authentication required")]
    Unauthorized,

    /// The server answered with a non-success status.
    #[error("{message}")]
    Rejected {
        /// HTTP status code
        status: u16,

        /// Message from the response body, or the status reason
        message: String,
    },

    /// The response body could not be decoded.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response envelope had no `data` member.
    #[error("response is missing its data")]
    MissingData,
}

impl ApiError {
    /// Whether the failure happened before any response arrived.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(Box::new(error))
        }
    }
}

/// `{ data, message }` body shared by every endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub(crate) data: Option<T>,

    #[serde(default)]
    pub(crate) message: Option<String>,
}

/// `{ message }` body of a failed request.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// HTTP transport shared by the API clients.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    /// Create a client for `base_url` whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (for example, TLS
    /// backend initialisation failed).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&AuthToken>,
    ) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{path}", self.base_url));

        match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    /// Send a request and return its status and raw body.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, String), ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(status = status.as_u16(), bytes = body.len(), "received response");

        Ok((status, body))
    }
}

/// Decode the `data` member of a response, mapping failures to [`ApiError`].
pub(crate) fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Unauthorized);
    }

    if !status.is_success() {
        return Err(rejection(status, body));
    }

    let envelope: Envelope<T> = serde_json::from_str(body)?;

    envelope.data.ok_or(ApiError::MissingData)
}

/// Build a [`ApiError::Rejected`] from a failed response.
pub(crate) fn rejection(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    ApiError::Rejected {
        status: status.as_u16(),
        message,
    }
}
