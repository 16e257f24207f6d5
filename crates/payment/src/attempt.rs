//! What a payment run produces.

use chrono::{DateTime, Utc};
use common::{Money, TransactionId};
use serde::{Deserialize, Serialize};

use crate::method::PaymentMethod;

/// Reason attached to every declined payment.
pub const DECLINE_REASON: &str = "Payment failed due to insufficient funds or network error";

/// Settlement status of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Accepted but collected later (cash on delivery).
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A successful payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAttempt {
    pub transaction_id: TransactionId,
    pub method: PaymentMethod,
    /// Charged total, method fee included.
    pub amount: Money,
    pub status: PaymentStatus,
    pub timestamp: DateTime<Utc>,
}

impl PaymentAttempt {
    /// Builds the attempt for an approved payment. Cash on delivery stays
    /// pending, everything else completes.
    pub fn approved(transaction_id: TransactionId, method: PaymentMethod, amount: Money) -> Self {
        let status = if method.settles_on_delivery() {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Completed
        };
        Self {
            transaction_id,
            method,
            amount,
            status,
            timestamp: Utc::now(),
        }
    }
}

/// A declined payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailure {
    pub transaction_id: TransactionId,
    pub method: PaymentMethod,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

impl PaymentFailure {
    pub fn declined(transaction_id: TransactionId, method: PaymentMethod) -> Self {
        Self {
            transaction_id,
            method,
            reason: DECLINE_REASON.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Result of one processing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum PaymentOutcome {
    Succeeded(PaymentAttempt),
    Failed(PaymentFailure),
}

impl PaymentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PaymentOutcome::Succeeded(_))
    }

    pub fn transaction_id(&self) -> &TransactionId {
        match self {
            PaymentOutcome::Succeeded(attempt) => &attempt.transaction_id,
            PaymentOutcome::Failed(failure) => &failure.transaction_id,
        }
    }

    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentOutcome::Succeeded(attempt) => attempt.method,
            PaymentOutcome::Failed(failure) => failure.method,
        }
    }
}
