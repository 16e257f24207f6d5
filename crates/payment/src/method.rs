//! Payment methods, their fees and their simulated processing times.

use std::collections::HashMap;
use std::time::Duration;

use common::Money;
use serde::{Deserialize, Serialize};

/// A way of paying for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// UPI (Google Pay, PhonePe, Paytm).
    #[default]
    Upi,

    /// Credit or debit card.
    Card,

    /// Net banking.
    NetBanking,

    /// Digital wallet.
    Wallet,

    /// Cash on delivery; settled at delivery time.
    Cod,
}

impl PaymentMethod {
    /// All methods in display order.
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::Upi,
        PaymentMethod::Card,
        PaymentMethod::NetBanking,
        PaymentMethod::Wallet,
        PaymentMethod::Cod,
    ];

    /// Returns true if payment is collected at delivery rather than now.
    pub fn settles_on_delivery(&self) -> bool {
        matches!(self, PaymentMethod::Cod)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
            PaymentMethod::NetBanking => "netbanking",
            PaymentMethod::Wallet => "wallet",
            PaymentMethod::Cod => "cod",
        }
    }

    /// Returns the name shown to shoppers.
    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Card => "Credit/Debit Card",
            PaymentMethod::NetBanking => "Net Banking",
            PaymentMethod::Wallet => "Digital Wallet",
            PaymentMethod::Cod => "Cash on Delivery",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Surcharge per method. Methods without an entry are free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentFees {
    fees: HashMap<PaymentMethod, Money>,
}

impl PaymentFees {
    /// A table where every method is free.
    pub fn none() -> Self {
        Self {
            fees: HashMap::new(),
        }
    }

    /// Overrides the fee of one method.
    pub fn with_fee(mut self, method: PaymentMethod, fee: Money) -> Self {
        self.fees.insert(method, fee);
        self
    }

    pub fn fee_for(&self, method: PaymentMethod) -> Money {
        self.fees.get(&method).copied().unwrap_or_default()
    }
}

impl Default for PaymentFees {
    /// Cash on delivery costs ₹25, everything else is free.
    fn default() -> Self {
        Self::none().with_fee(PaymentMethod::Cod, Money::from_rupees(25))
    }
}

/// Simulated processing time per method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingDelays {
    delays: HashMap<PaymentMethod, Duration>,
    fallback: Duration,
}

impl ProcessingDelays {
    /// Uses the same delay for every method.
    pub fn uniform(delay: Duration) -> Self {
        Self {
            delays: HashMap::new(),
            fallback: delay,
        }
    }

    /// No delay at all.
    pub fn instant() -> Self {
        Self::uniform(Duration::ZERO)
    }

    pub fn with_delay(mut self, method: PaymentMethod, delay: Duration) -> Self {
        self.delays.insert(method, delay);
        self
    }

    pub fn delay_for(&self, method: PaymentMethod) -> Duration {
        self.delays.get(&method).copied().unwrap_or(self.fallback)
    }
}

impl Default for ProcessingDelays {
    fn default() -> Self {
        Self::uniform(Duration::from_secs(4))
            .with_delay(PaymentMethod::Upi, Duration::from_secs(3))
            .with_delay(PaymentMethod::Card, Duration::from_secs(5))
            .with_delay(PaymentMethod::Cod, Duration::from_secs(1))
    }
}
