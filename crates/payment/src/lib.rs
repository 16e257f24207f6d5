//! Simulated payment gateway.
//!
//! A [`PaymentGateway`] is opened for an order total and walks
//! `Method → Processing → Success | Failure`, with `Failure → Method` on retry
//! and `Method → Cancelled`. Details are validated per method, processing
//! waits a per-method delay, and an injected [`OutcomeDecider`] approves or
//! declines. Closing the [`GatewayHandle`] aborts processing without an
//! outcome.

pub mod attempt;
pub mod decision;
pub mod details;
pub mod error;
pub mod gateway;
pub mod method;
pub mod state;
pub mod validation;

pub use attempt::{DECLINE_REASON, PaymentAttempt, PaymentFailure, PaymentOutcome, PaymentStatus};
pub use decision::{
    DEFAULT_SUCCESS_RATE, FixedDecider, OutcomeDecider, PaymentDecision, RandomDecider,
    ScriptedDecider,
};
pub use details::{CardDetails, PaymentDetails};
pub use error::{PaymentError, Result};
pub use gateway::{GatewayHandle, PaymentGateway};
pub use method::{PaymentFees, PaymentMethod, ProcessingDelays};
pub use state::PaymentStep;
