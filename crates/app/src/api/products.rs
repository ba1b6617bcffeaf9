//! Product catalog client.

use async_trait::async_trait;
use kart::products::{Product, ProductId};
use mockall::automock;
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::api::{ApiClient, ApiError, decode};

const PRODUCTS_PATH: &str = "/products";

#[derive(Debug, Deserialize)]
struct ProductsData {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct ProductData {
    product: Product,
}

/// Read-only product catalog.
#[automock]
#[async_trait]
pub trait ProductsApi: Send + Sync {
    /// `GET /products`: every listed product.
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;

    /// `GET /products/{id}`: a single product snapshot.
    async fn get_product(&self, product: &ProductId) -> Result<Product, ApiError>;
}

/// [`ProductsApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProductsApi {
    client: ApiClient,
}

impl HttpProductsApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProductsApi for HttpProductsApi {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        debug!("GET {PRODUCTS_PATH}");

        let request = self.client.request(Method::GET, PRODUCTS_PATH, None);
        let (status, body) = self.client.send(request).await?;

        decode::<ProductsData>(status, &body).map(|data| data.products)
    }

    async fn get_product(&self, product: &ProductId) -> Result<Product, ApiError> {
        let path = format!("{PRODUCTS_PATH}/{product}");

        debug!("GET {path}");

        let request = self.client.request(Method::GET, &path, None);
        let (status, body) = self.client.send(request).await?;

        decode::<ProductData>(status, &body).map(|data| data.product)
    }
}
