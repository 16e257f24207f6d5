//! Checkout error types.

use common::{FieldErrors, Money, TransactionId};
use payment::{PaymentAttempt, PaymentError, PaymentFailure};
use thiserror::Error;

use crate::address::AddressId;
use crate::step::CheckoutStep;

/// Errors returned by [`CheckoutSession`](crate::CheckoutSession) commands.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// Checkout needs at least one cart line.
    #[error("Your cart is empty")]
    EmptyCart,

    /// The address form failed validation.
    #[error("Invalid address: {0}")]
    InvalidAddress(FieldErrors),

    #[error("Please select a delivery address")]
    NoAddressSelected,

    #[error("Please select a delivery option")]
    NoDeliverySelected,

    /// The command is not allowed in the current step.
    #[error("Cannot {operation} during the {step} step")]
    InvalidStep {
        operation: &'static str,
        step: CheckoutStep,
    },

    #[error("Address not found: {0}")]
    UnknownAddress(AddressId),

    /// The payment was declined. The session stays on the payment step.
    #[error("Payment failed: {}", .0.reason)]
    PaymentFailed(PaymentFailure),

    /// The outcome did not come from the gateway this session opened.
    #[error("Payment {0} does not belong to this checkout")]
    UnknownPayment(TransactionId),

    /// The gateway charged something other than the frozen total.
    #[error("Payment of {charged} does not match the order total of {expected}")]
    PaymentAmountMismatch { expected: Money, charged: Money },

    /// Payment succeeded but the order could not be created.
    #[error("Order could not be created after payment {}: {reason}", .payment.transaction_id)]
    OrderCreation {
        payment: PaymentAttempt,
        reason: String,
    },

    /// An earlier order-creation failure ended this session.
    #[error("Checkout session has ended")]
    SessionTerminated,

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

/// Errors from the order service.
#[derive(Debug, Error)]
pub enum OrderServiceError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Order service error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered `success: false`.
    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    #[error("Order service unavailable")]
    Unavailable,
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
