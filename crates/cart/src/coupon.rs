//! Percentage coupons and the catalog they are validated against.

use common::Money;
use serde::{Deserialize, Serialize};

use crate::error::CartError;

/// A named percentage discount with a minimum-order threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    pub discount_percent: u32,
    pub min_order_amount: Money,
    #[serde(default)]
    pub description: String,
}

impl Coupon {
    /// Creates a coupon.
    pub fn new(code: impl Into<String>, discount_percent: u32, min_order_amount: Money) -> Self {
        Self {
            code: code.into(),
            discount_percent,
            min_order_amount,
            description: String::new(),
        }
    }

    /// Sets the display description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns true if the coupon may be applied to the given subtotal.
    pub fn is_eligible(&self, subtotal: Money) -> bool {
        subtotal >= self.min_order_amount
    }

    /// Returns the discount this coupon grants on the given subtotal.
    pub fn discount_for(&self, subtotal: Money) -> Money {
        subtotal.percent_of(self.discount_percent)
    }
}

/// The set of coupons a cart accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponCatalog {
    coupons: Vec<Coupon>,
}

impl CouponCatalog {
    /// Creates a catalog from a list of coupons.
    pub fn new(coupons: Vec<Coupon>) -> Self {
        Self { coupons }
    }

    /// Creates a catalog with no coupons.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Returns all coupons.
    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    /// Looks up a coupon by code, ignoring case and surrounding whitespace.
    pub fn find(&self, code: &str) -> Option<&Coupon> {
        let code = code.trim();
        self.coupons
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
    }

    /// Validates a code against the catalog and a subtotal.
    ///
    /// Returns the coupon and the discount it grants.
    pub fn validate(&self, code: &str, subtotal: Money) -> Result<(Coupon, Money), CartError> {
        let coupon = self.find(code).ok_or_else(|| CartError::UnknownCoupon {
            code: code.trim().to_string(),
        })?;

        if !coupon.is_eligible(subtotal) {
            return Err(CartError::CouponMinimumNotMet {
                code: coupon.code.clone(),
                min_order: coupon.min_order_amount,
                subtotal,
            });
        }

        Ok((coupon.clone(), coupon.discount_for(subtotal)))
    }
}

impl Default for CouponCatalog {
    fn default() -> Self {
        Self::new(vec![
            Coupon::new("BHARATSHAALA10", 10, Money::from_rupees(1000))
                .with_description("10% off on orders of ₹1000+"),
            Coupon::new("FIRST25", 25, Money::from_rupees(500))
                .with_description("25% off your first order"),
            Coupon::new("HERITAGE15", 15, Money::from_rupees(1500))
                .with_description("15% off heritage products"),
        ])
    }
}
