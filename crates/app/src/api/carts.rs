//! Remote cart service client.

use async_trait::async_trait;
use kart::{carts::Cart, products::ProductId};
use mockall::automock;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    api::{ApiClient, ApiError, Envelope, decode},
    auth::AuthToken,
};

const CARTS_PATH: &str = "/carts";
const REMOVE_LINE_PATH: &str = "/carts/delete";
const CLEAR_PATH: &str = "/carts/clear";

/// Outcome of an add-to-cart request.
#[derive(Debug, Clone, PartialEq)]
pub enum AddToCartResponse {
    /// The units were added; `cart` is the server's new cart.
    Added {
        /// Cart after the addition
        cart: Cart,

        /// Server flagged the resulting quantity as unusually large
        large_quantity: bool,
    },

    /// Not enough stock; the server suggests a smaller quantity.
    ShouldAdjust {
        /// Units the server can accept for this request
        available_quantity: u32,

        /// Human-readable reason from the server
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct CartData {
    cart: Cart,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddData {
    #[serde(default)]
    cart: Option<Cart>,

    #[serde(default)]
    is_large_quantity: bool,

    #[serde(default)]
    should_adjust: bool,

    #[serde(default)]
    available_quantity: Option<u32>,

    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClearData {
    #[serde(default)]
    cart: Option<Cart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddBody<'a> {
    product_id: &'a ProductId,
    quantity: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductBody<'a> {
    product_id: &'a ProductId,
}

/// Remote cart service, keyed by the user behind the bearer token.
#[automock]
#[async_trait]
pub trait CartsApi: Send + Sync {
    /// `GET /carts`: the user's current cart.
    async fn fetch_cart(&self, token: &AuthToken) -> Result<Cart, ApiError>;

    /// `POST /carts`: add `quantity` units of `product`.
    async fn add_to_cart(
        &self,
        token: &AuthToken,
        product: &ProductId,
        quantity: u32,
    ) -> Result<AddToCartResponse, ApiError>;

    /// `DELETE /carts`: remove one unit of `product`.
    async fn decrease_quantity(
        &self,
        token: &AuthToken,
        product: &ProductId,
    ) -> Result<Cart, ApiError>;

    /// `DELETE /carts/delete`: remove the whole line holding `product`.
    async fn remove_line(&self, token: &AuthToken, product: &ProductId) -> Result<Cart, ApiError>;

    /// `DELETE /carts/clear`: remove every line.
    async fn clear_cart(&self, token: &AuthToken) -> Result<Cart, ApiError>;
}

/// [`CartsApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCartsApi {
    client: ApiClient,
}

impl HttpCartsApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn fetch_request(&self, token: &AuthToken) -> RequestBuilder {
        self.client.request(Method::GET, CARTS_PATH, Some(token))
    }

    fn add_request(&self, token: &AuthToken, product: &ProductId, quantity: u32) -> RequestBuilder {
        self.client
            .request(Method::POST, CARTS_PATH, Some(token))
            .json(&AddBody {
                product_id: product,
                quantity,
            })
    }

    fn decrease_request(&self, token: &AuthToken, product: &ProductId) -> RequestBuilder {
        self.client
            .request(Method::DELETE, CARTS_PATH, Some(token))
            .json(&ProductBody { product_id: product })
    }

    fn remove_line_request(&self, token: &AuthToken, product: &ProductId) -> RequestBuilder {
        self.client
            .request(Method::DELETE, REMOVE_LINE_PATH, Some(token))
            .json(&ProductBody { product_id: product })
    }

    fn clear_request(&self, token: &AuthToken) -> RequestBuilder {
        self.client.request(Method::DELETE, CLEAR_PATH, Some(token))
    }
}

#[async_trait]
impl CartsApi for HttpCartsApi {
    async fn fetch_cart(&self, token: &AuthToken) -> Result<Cart, ApiError> {
        debug!("GET {CARTS_PATH}");

        let (status, body) = self.client.send(self.fetch_request(token)).await?;

        decode::<CartData>(status, &body).map(|data| data.cart)
    }

    async fn add_to_cart(
        &self,
        token: &AuthToken,
        product: &ProductId,
        quantity: u32,
    ) -> Result<AddToCartResponse, ApiError> {
        debug!(%product, quantity, "POST {CARTS_PATH}");

        let request = self.add_request(token, product, quantity);
        let (status, body) = self.client.send(request).await?;

        decode_add_response(status, &body)
    }

    async fn decrease_quantity(
        &self,
        token: &AuthToken,
        product: &ProductId,
    ) -> Result<Cart, ApiError> {
        debug!(%product, "DELETE {CARTS_PATH}");

        let request = self.decrease_request(token, product);
        let (status, body) = self.client.send(request).await?;

        decode::<CartData>(status, &body).map(|data| data.cart)
    }

    async fn remove_line(&self, token: &AuthToken, product: &ProductId) -> Result<Cart, ApiError> {
        debug!(%product, "DELETE {REMOVE_LINE_PATH}");

        let request = self.remove_line_request(token, product);
        let (status, body) = self.client.send(request).await?;

        decode::<CartData>(status, &body).map(|data| data.cart)
    }

    async fn clear_cart(&self, token: &AuthToken) -> Result<Cart, ApiError> {
        debug!("DELETE {CLEAR_PATH}");

        let (status, body) = self.client.send(self.clear_request(token)).await?;

        decode_clear_response(status, &body)
    }
}

/// Interpret an add-to-cart response.
///
/// The stock-shortfall signal arrives inside a non-success response, so it is
/// looked for before the status is treated as a failure.
pub(crate) fn decode_add_response(
    status: StatusCode,
    body: &str,
) -> Result<AddToCartResponse, ApiError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Unauthorized);
    }

    if let Some(adjustment) = adjustment_signal(body) {
        return Ok(adjustment);
    }

    let data: AddData = decode(status, body)?;
    let cart = data.cart.ok_or(ApiError::MissingData)?;

    Ok(AddToCartResponse::Added {
        cart,
        large_quantity: data.is_large_quantity,
    })
}

fn adjustment_signal(body: &str) -> Option<AddToCartResponse> {
    let envelope: Envelope<AddData> = serde_json::from_str(body).ok()?;
    let data = envelope.data?;

    if !data.should_adjust {
        return None;
    }

    Some(AddToCartResponse::ShouldAdjust {
        available_quantity: data.available_quantity.unwrap_or(0),
        message: data.message.or(envelope.message).unwrap_or_default(),
    })
}

/// Interpret a clear-cart response; a body without a cart means the cart is empty.
pub(crate) fn decode_clear_response(status: StatusCode, body: &str) -> Result<Cart, ApiError> {
    let data: ClearData = decode(status, body)?;

    Ok(data.cart.unwrap_or_default())
}
