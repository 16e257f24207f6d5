//! Persisted cart payload.

use common::Money;
use serde::{Deserialize, Serialize};

use crate::coupon::Coupon;
use crate::item::CartItem;

/// Serialized form of a cart, written to local storage after every mutation
/// and returned by the remote cart service.
///
/// Totals are carried for compatibility with existing stored payloads; the
/// reducer recomputes them from `items` on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub total_amount: Money,
    #[serde(default)]
    pub applied_coupon: Option<Coupon>,
    #[serde(default)]
    pub discount: Money,
    /// Only present on payloads coming from the remote service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_cost: Option<Money>,
}

impl CartSnapshot {
    /// Parses a snapshot from its JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serializes the snapshot to JSON text.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Returns true if the stored totals match the items.
    pub fn totals_consistent(&self) -> bool {
        let items: u32 = self.items.iter().map(|i| i.quantity).sum();
        let amount: Money = self.items.iter().map(CartItem::line_total).sum();
        items == self.total_items && amount == self.total_amount
    }
}
