//! Products

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::ids::TypedId;

/// Product identifier
pub type ProductId = TypedId<Product>;

/// Whether a product can currently be bought.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Listed and purchasable
    #[default]
    Active,

    /// Temporarily withdrawn from sale
    #[serde(alias = "inactive")]
    Suspended,
}

/// Product snapshot, as served by the catalog or embedded in a cart line.
///
/// The client never mutates products; every snapshot is replaced by the next
/// one the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Unit price in minor units
    pub price: u64,

    /// Discount in percentage points (0-100)
    #[serde(default)]
    pub discount: Decimal,

    /// Units in stock, when the server reported them
    #[serde(rename = "quantity", alias = "stock", default)]
    pub stock: Option<u32>,

    /// Sale status
    #[serde(default)]
    pub status: ProductStatus,
}

impl Product {
    /// The discount as a fraction, clamped into `0..=1`.
    pub fn discount_rate(&self) -> Percentage {
        let points = self.discount.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);

        Percentage::from(points / Decimal::ONE_HUNDRED)
    }

    /// Unit price after discount, in minor units.
    ///
    /// Rounded half away from zero; never negative and never above the unit price.
    pub fn effective_price(&self) -> u64 {
        let price = Decimal::from(self.price);
        let reduction = self.discount_rate() * price;

        (price - reduction)
            .max(Decimal::ZERO)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .unwrap_or(self.price)
    }

    /// Whether the product is listed for sale.
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }
}
