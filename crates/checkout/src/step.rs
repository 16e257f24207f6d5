//! Checkout wizard steps.

use serde::{Deserialize, Serialize};

/// The step a checkout session is on.
///
/// ```text
/// Address ──► Delivery ──► Payment ──► Confirmation
///    ◄────────── back ◄────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutStep {
    #[default]
    Address,
    Delivery,
    Payment,
    /// Order placed (terminal state).
    Confirmation,
}

impl CheckoutStep {
    /// Returns the 1-based position shown in the progress bar.
    pub fn number(&self) -> u8 {
        match self {
            CheckoutStep::Address => 1,
            CheckoutStep::Delivery => 2,
            CheckoutStep::Payment => 3,
            CheckoutStep::Confirmation => 4,
        }
    }

    /// Returns the step reached by `advance`, if `advance` applies.
    ///
    /// `Payment` has none: confirmation requires a successful payment.
    pub fn next(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Address => Some(CheckoutStep::Delivery),
            CheckoutStep::Delivery => Some(CheckoutStep::Payment),
            CheckoutStep::Payment | CheckoutStep::Confirmation => None,
        }
    }

    /// Returns the step reached by `back`, if going back is allowed.
    pub fn previous(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Delivery => Some(CheckoutStep::Address),
            CheckoutStep::Payment => Some(CheckoutStep::Delivery),
            CheckoutStep::Address | CheckoutStep::Confirmation => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutStep::Confirmation)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Address => "Address",
            CheckoutStep::Delivery => "Delivery",
            CheckoutStep::Payment => "Payment",
            CheckoutStep::Confirmation => "Confirmation",
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
