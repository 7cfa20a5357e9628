//! Cart totals shown alongside the checkout form.

use serde::{Deserialize, Serialize};

use super::price::{CurrencyCode, Price};

/// Running cart totals.
///
/// Owned and mutated by the cart service; checkout only keeps a read-only
/// cached copy for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Total price of all cart lines.
    pub total_price: Price,
    /// Total number of items.
    pub total_quantity: u32,
}

impl CartSummary {
    /// An empty cart in the given currency.
    #[must_use]
    pub const fn empty(currency_code: CurrencyCode) -> Self {
        Self {
            total_price: Price::zero(currency_code),
            total_quantity: 0,
        }
    }

    /// Whether the cart has no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_quantity == 0
    }
}

impl Default for CartSummary {
    fn default() -> Self {
        Self::empty(CurrencyCode::default())
    }
}
