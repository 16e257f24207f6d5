//! Payment error types.

use common::FieldErrors;
use thiserror::Error;

use crate::method::PaymentMethod;
use crate::state::PaymentStep;

/// Errors returned by [`PaymentGateway`](crate::PaymentGateway) commands.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// Entered details failed validation; the gateway stays on method selection.
    #[error("Invalid payment details: {0}")]
    Validation(FieldErrors),

    /// The command is not allowed in the current step.
    #[error("Cannot {operation} while payment is in {step} step")]
    InvalidStep {
        operation: &'static str,
        step: PaymentStep,
    },

    /// Submitted details belong to another method than the selected one.
    #[error("Details for {provided} submitted but {selected} is selected")]
    MethodMismatch {
        selected: PaymentMethod,
        provided: PaymentMethod,
    },

    /// The gateway was closed; no outcome was produced.
    #[error("Payment gateway closed")]
    Closed,
}

/// Convenience type alias for payment results.
pub type Result<T> = std::result::Result<T, PaymentError>;
