//! Payment gateway steps.

use serde::{Deserialize, Serialize};

/// Where a gateway is in its lifecycle.
///
/// State transitions:
/// ```text
/// Method ──► Processing ──┬──► Success
///   │  ▲  ▲               ├──► Failure
///   │  │  └── abandoned ──┘       │
///   │  └──────── retry ───────────┘
///   └──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStep {
    /// Choosing a method and entering details.
    #[default]
    Method,

    /// Waiting on the simulated processor. A submission dropped while here
    /// returns to `Method`.
    Processing,

    /// Payment went through (terminal state).
    Success,

    /// Payment was declined; may be retried.
    Failure,

    /// Abandoned by the shopper or the gateway was closed (terminal state).
    Cancelled,
}

impl PaymentStep {
    /// Returns true if a method may be chosen and details submitted.
    pub fn can_submit(&self) -> bool {
        matches!(self, PaymentStep::Method)
    }

    /// Returns true if the gateway may return to method selection.
    pub fn can_retry(&self) -> bool {
        matches!(self, PaymentStep::Failure)
    }

    /// Returns true if the shopper may back out.
    pub fn can_cancel(&self) -> bool {
        matches!(self, PaymentStep::Method)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStep::Success | PaymentStep::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStep::Method => "Method",
            PaymentStep::Processing => "Processing",
            PaymentStep::Success => "Success",
            PaymentStep::Failure => "Failure",
            PaymentStep::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for PaymentStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_step_is_method() {
        assert_eq!(PaymentStep::default(), PaymentStep::Method);
    }

    #[test]
    fn test_only_method_accepts_submission() {
        assert!(PaymentStep::Method.can_submit());
        assert!(!PaymentStep::Processing.can_submit());
        assert!(!PaymentStep::Failure.can_submit());
        assert!(!PaymentStep::Success.can_submit());
        assert!(!PaymentStep::Cancelled.can_submit());
    }

    #[test]
    fn test_only_failure_can_retry() {
        assert!(PaymentStep::Failure.can_retry());
        assert!(!PaymentStep::Method.can_retry());
        assert!(!PaymentStep::Success.can_retry());
    }

    #[test]
    fn test_terminal_states() {
        assert!(PaymentStep::Success.is_terminal());
        assert!(PaymentStep::Cancelled.is_terminal());
        assert!(!PaymentStep::Failure.is_terminal());
        assert!(!PaymentStep::Processing.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(PaymentStep::Processing.to_string(), "Processing");
    }
}
