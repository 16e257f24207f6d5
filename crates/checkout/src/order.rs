//! The frozen order handed to the order service.

use cart::{CartItem, CartSummary};
use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, ProductId};
use payment::PaymentAttempt;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::delivery::{DeliveryOption, DeliveryPricing};

/// A line of an order, copied from the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
    pub seller: String,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
            seller: item.seller.clone(),
        }
    }
}

/// Chosen delivery option and what it costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverySelection {
    pub option: DeliveryOption,
    pub cost: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub subtotal: Money,
    /// Delivery cost.
    pub shipping: Money,
    pub discount: Money,
    pub total: Money,
}

impl OrderSummary {
    /// Builds a summary with `total = max(0, subtotal + shipping - discount)`.
    pub fn new(subtotal: Money, shipping: Money, discount: Money) -> Self {
        Self {
            subtotal,
            shipping,
            discount,
            total: (subtotal + shipping - discount).clamp_non_negative(),
        }
    }
}

/// Immutable snapshot of what is being bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    #[serde(rename = "items")]
    pub lines: Vec<OrderLine>,
    pub address: Address,
    pub delivery: DeliverySelection,
    pub summary: OrderSummary,
}

impl Order {
    /// Assembles an order from cart contents. Delivery is priced against the
    /// cart subtotal; the cart's own shipping estimate is ignored.
    pub fn assemble(
        items: &[CartItem],
        cart_summary: &CartSummary,
        address: Address,
        option: DeliveryOption,
        pricing: &DeliveryPricing,
        customer_id: Option<CustomerId>,
    ) -> Self {
        let cost = pricing.cost(option, cart_summary.subtotal);
        Self {
            customer_id,
            lines: items.iter().map(OrderLine::from).collect(),
            address,
            delivery: DeliverySelection { option, cost },
            summary: OrderSummary::new(cart_summary.subtotal, cost, cart_summary.discount),
        }
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Confirmed,
}

/// Payload of `POST /orders`: the order plus its payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(flatten)]
    pub order: Order,
    pub payment: PaymentAttempt,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
}

impl OrderRequest {
    pub fn confirmed(order: Order, payment: PaymentAttempt) -> Self {
        Self {
            order,
            payment,
            status: OrderStatus::Confirmed,
            order_date: Utc::now(),
        }
    }
}

/// A successfully placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub order: Order,
    pub payment: PaymentAttempt,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::NewAddress;
    use cart::ProductListing;
    use common::TransactionId;
    use payment::PaymentMethod;

    fn address() -> Address {
        NewAddress {
            name: "Asha Rao".into(),
            phone: "9876543210".into(),
            address_line1: "12 MG Road".into(),
            city: "Bengaluru".into(),
            pincode: "560001".into(),
            ..Default::default()
        }
        .into_address()
        .unwrap()
    }

    fn items() -> Vec<CartItem> {
        vec![
            ProductListing::new("p1", "Shawl", Money::from_rupees(400)).to_cart_item(2),
            ProductListing::new("p2", "Diya", Money::from_rupees(50)).to_cart_item(1),
        ]
    }

    #[test]
    fn test_assemble_prices_delivery_against_subtotal() {
        let cart = CartSummary::compute(
            Money::from_rupees(850),
            Money::from_rupees(40),
            Money::from_rupees(85),
            3,
            None,
        );
        let order = Order::assemble(
            &items(),
            &cart,
            address(),
            DeliveryOption::Standard,
            &DeliveryPricing::default(),
            None,
        );

        assert_eq!(order.delivery.cost, Money::from_rupees(49));
        assert_eq!(order.summary.shipping, Money::from_rupees(49));
        assert_eq!(order.summary.total, Money::from_rupees(814));
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.lines[0].line_total(), Money::from_rupees(800));
    }

    #[test]
    fn test_summary_total_never_negative() {
        let summary = OrderSummary::new(Money::from_rupees(10), Money::zero(), Money::from_rupees(50));
        assert_eq!(summary.total, Money::zero());
    }

    #[test]
    fn test_request_wire_shape() {
        let cart = CartSummary::compute(Money::from_rupees(850), Money::zero(), Money::zero(), 3, None);
        let order = Order::assemble(
            &items(),
            &cart,
            address(),
            DeliveryOption::Express,
            &DeliveryPricing::default(),
            Some(CustomerId::new()),
        );
        let payment = PaymentAttempt::approved(
            TransactionId::generate(),
            PaymentMethod::Upi,
            order.summary.total,
        );
        let json = serde_json::to_value(OrderRequest::confirmed(order, payment)).unwrap();

        assert!(json["userId"].is_string());
        assert_eq!(json["items"][0]["productId"], "p1");
        assert_eq!(json["delivery"]["option"], "express");
        assert_eq!(json["status"], "confirmed");
        assert!(json["orderDate"].is_string());
        assert_eq!(json["payment"]["status"], "completed");
    }
}
