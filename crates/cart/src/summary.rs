use common::Money;
use serde::{Deserialize, Serialize};

use crate::coupon::Coupon;

/// Derived monetary totals for display and checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub subtotal: Money,
    pub shipping: Money,
    pub discount: Money,
    /// `subtotal + shipping - discount`, never below zero.
    pub total: Money,
    pub item_count: u32,
    pub applied_coupon: Option<Coupon>,
}

impl CartSummary {
    /// Computes a summary, clamping the total at zero.
    pub fn compute(
        subtotal: Money,
        shipping: Money,
        discount: Money,
        item_count: u32,
        applied_coupon: Option<Coupon>,
    ) -> Self {
        Self {
            subtotal,
            shipping,
            discount,
            total: (subtotal + shipping - discount).clamp_non_negative(),
            item_count,
            applied_coupon,
        }
    }
}
