//! Large-Quantity Confirmations

use rustc_hash::FxHashSet;

use crate::products::ProductId;

/// Products for which the user already accepted the large-quantity prompt.
///
/// Scoped to one cart-review session: create it when the session opens and
/// drop it (or [`reset`](Self::reset) it) when the session ends. Nothing is
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LargeQuantityConfirmations {
    products: FxHashSet<ProductId>,
}

impl LargeQuantityConfirmations {
    /// An empty confirmation set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmation. Returns `false` if it was already recorded.
    pub fn confirm(&mut self, product: ProductId) -> bool {
        self.products.insert(product)
    }

    /// Whether the user confirmed a large quantity for `product`.
    pub fn is_confirmed(&self, product: &ProductId) -> bool {
        self.products.contains(product)
    }

    /// Forget every confirmation.
    pub fn reset(&mut self) {
        self.products.clear();
    }

    /// Number of confirmed products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether nothing has been confirmed.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmations_are_per_product() {
        let mut confirmations = LargeQuantityConfirmations::new();

        assert!(confirmations.confirm(ProductId::new("a")));
        assert!(!confirmations.confirm(ProductId::new("a")));

        assert!(confirmations.is_confirmed(&ProductId::new("a")));
        assert!(!confirmations.is_confirmed(&ProductId::new("b")));
    }

    #[test]
    fn reset_forgets_everything() {
        let mut confirmations = LargeQuantityConfirmations::new();

        confirmations.confirm(ProductId::new("a"));
        confirmations.reset();

        assert!(confirmations.is_empty());
        assert!(!confirmations.is_confirmed(&ProductId::new("a")));
    }
}
