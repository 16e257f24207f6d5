//! Delivery options and their pricing.

use common::Money;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOption {
    #[default]
    Standard,
    Express,
    SameDay,
}

impl DeliveryOption {
    pub const ALL: [DeliveryOption; 3] = [
        DeliveryOption::Standard,
        DeliveryOption::Express,
        DeliveryOption::SameDay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryOption::Standard => "standard",
            DeliveryOption::Express => "express",
            DeliveryOption::SameDay => "same_day",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DeliveryOption::Standard => "Standard Delivery",
            DeliveryOption::Express => "Express Delivery",
            DeliveryOption::SameDay => "Same Day Delivery",
        }
    }

    /// Promised delivery window.
    pub fn estimate(&self) -> &'static str {
        match self {
            DeliveryOption::Standard => "5-7 business days",
            DeliveryOption::Express => "2-3 business days",
            DeliveryOption::SameDay => "Today (select cities)",
        }
    }
}

impl std::fmt::Display for DeliveryOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Delivery price list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPricing {
    pub standard: Money,
    /// Standard delivery is free at or above this subtotal.
    pub free_standard_threshold: Money,
    pub express: Money,
    pub same_day: Money,
}

impl DeliveryPricing {
    pub fn cost(&self, option: DeliveryOption, subtotal: Money) -> Money {
        match option {
            DeliveryOption::Standard if subtotal >= self.free_standard_threshold => Money::zero(),
            DeliveryOption::Standard => self.standard,
            DeliveryOption::Express => self.express,
            DeliveryOption::SameDay => self.same_day,
        }
    }
}

impl Default for DeliveryPricing {
    fn default() -> Self {
        Self {
            standard: Money::from_rupees(49),
            free_standard_threshold: Money::from_rupees(999),
            express: Money::from_rupees(99),
            same_day: Money::from_rupees(199),
        }
    }
}
