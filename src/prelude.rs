//! Prelude

pub use crate::{
    carts::{Cart, CartId, CartLine, CartLineId},
    checkout::{CheckoutError, CheckoutOrchestrator, CheckoutSelection},
    confirmations::LargeQuantityConfirmations,
    ids::TypedId,
    pricing::{PricingError, line_total, money, total_of},
    products::{Product, ProductId, ProductStatus},
    rules::{IncreaseDecision, LARGE_QUANTITY_THRESHOLD, RuleError, evaluate_increase},
    selection::SelectionSet,
};
