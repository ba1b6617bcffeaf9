//! Fixtures

use std::{fs, path::Path};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    carts::{Cart, CartId, CartLine, CartLineId},
    products::{Product, ProductId, ProductStatus},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A line references a product the fixture does not define
    #[error("Product not found: {0}")]
    ProductNotFound(String),
}

/// A product in a cart fixture file.
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Unit price in minor units
    pub price: u64,

    /// Discount in percentage points
    #[serde(default)]
    pub discount: Decimal,

    /// Units in stock
    #[serde(default)]
    pub stock: Option<u32>,

    /// Whether the product is suspended
    #[serde(default)]
    pub suspended: bool,
}

/// A cart line in a cart fixture file.
#[derive(Debug, Deserialize)]
pub struct LineFixture {
    /// Key of the product in the `products` map
    pub product: String,

    /// Units in the cart
    pub quantity: u32,
}

/// A cart fixture file: a product map and the lines referencing it.
///
/// ```yaml
/// products:
///   tea: { name: Trà, price: 100, discount: 10, stock: 20 }
/// lines:
///   - { product: tea, quantity: 2 }
/// ```
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,

    /// Cart lines, in order
    #[serde(default)]
    pub lines: Vec<LineFixture>,
}

impl CartFixture {
    /// Parse a fixture from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Yaml`] if the document is not a valid fixture.
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Load a fixture from `fixtures/carts/<name>.yml` under `base_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_set(base_path: impl AsRef<Path>, name: &str) -> Result<Self, FixtureError> {
        let path = base_path
            .as_ref()
            .join("fixtures")
            .join("carts")
            .join(format!("{name}.yml"));

        Self::from_yaml(&fs::read_to_string(path)?)
    }

    /// Product snapshot for the given key.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::ProductNotFound`] if the key is not defined.
    pub fn product(&self, key: &str) -> Result<Product, FixtureError> {
        let fixture = self
            .products
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))?;

        Ok(Product {
            id: ProductId::new(key),
            name: fixture.name.clone(),
            price: fixture.price,
            discount: fixture.discount,
            stock: fixture.stock,
            status: if fixture.suspended {
                ProductStatus::Suspended
            } else {
                ProductStatus::Active
            },
        })
    }

    /// Build the cart the fixture describes.
    ///
    /// Line identifiers are `line-<product key>`.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::ProductNotFound`] if a line references an unknown product.
    pub fn cart(&self) -> Result<Cart, FixtureError> {
        let items = self
            .lines
            .iter()
            .map(|line| {
                let product = self.product(&line.product)?;

                Ok(CartLine {
                    id: CartLineId::new(format!("line-{}", line.product)),
                    price: Some(Decimal::from(product.price)),
                    product,
                    quantity: line.quantity,
                })
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        Ok(Cart {
            id: Some(CartId::new("fixture-cart")),
            items,
            total_price: None,
        })
    }
}

/// An active product with the given key as its identifier.
pub fn product(key: &str, price: u64, discount: i64, stock: Option<u32>) -> Product {
    Product {
        id: ProductId::new(key),
        name: key.to_string(),
        price,
        discount: Decimal::from(discount),
        stock,
        status: ProductStatus::Active,
    }
}

/// A line `line-<key>` holding `quantity` units of [`product`]`(key, ..)`.
pub fn line(key: &str, price: u64, discount: i64, quantity: u32, stock: Option<u32>) -> CartLine {
    CartLine {
        id: CartLineId::new(format!("line-{key}")),
        product: product(key, price, discount, stock),
        quantity,
        price: Some(Decimal::from(price)),
    }
}

/// A persisted cart holding `lines`.
pub fn cart(lines: Vec<CartLine>) -> Cart {
    Cart {
        id: Some(CartId::new("cart")),
        items: lines,
        total_price: None,
    }
}
