//! Carts

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    ids::TypedId,
    products::{Product, ProductId},
};

/// Cart identifier
pub type CartId = TypedId<Cart>;

/// Cart line identifier
pub type CartLineId = TypedId<CartLine>;

/// One product and quantity entry within a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Line identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: CartLineId,

    /// Product snapshot taken when the server built the response
    pub product: Product,

    /// Units of the product in the cart
    pub quantity: u32,

    /// Unit price the server recorded for the line, kept verbatim for display
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl CartLine {
    /// Discounted unit price of the line's product.
    pub fn unit_price(&self) -> u64 {
        self.product.effective_price()
    }

    /// Discounted unit price multiplied by quantity, saturating at `u64::MAX`.
    pub fn line_total(&self) -> u64 {
        self.unit_price().saturating_mul(u64::from(self.quantity))
    }
}

/// Cart snapshot, as returned by the remote cart service.
///
/// A `Cart` is always replaced as a whole; it is never patched line by line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart identifier, absent for a cart the server has not persisted yet
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<CartId>,

    /// Lines in server order
    #[serde(default)]
    pub items: Vec<CartLine>,

    /// Total computed by the server, kept verbatim for display
    #[serde(default)]
    pub total_price: Option<Decimal>,
}

impl Cart {
    /// A cart with no lines.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lines in server order.
    pub fn lines(&self) -> &[CartLine] {
        &self.items
    }

    /// Look up a line by its identifier.
    pub fn line(&self, id: &CartLineId) -> Option<&CartLine> {
        self.items.iter().find(|line| &line.id == id)
    }

    /// Look up the line holding the given product.
    pub fn line_for_product(&self, product: &ProductId) -> Option<&CartLine> {
        self.items.iter().find(|line| &line.product.id == product)
    }

    /// Units of the given product currently in the cart.
    pub fn quantity_of(&self, product: &ProductId) -> u32 {
        self.line_for_product(product)
            .map_or(0, |line| line.quantity)
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
