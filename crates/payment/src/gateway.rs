//! The payment gateway state machine.

use std::sync::Arc;
use std::time::Instant;

use common::{FieldErrors, Money, TransactionId};
use tokio::sync::watch;

use crate::attempt::{PaymentAttempt, PaymentFailure, PaymentOutcome};
use crate::decision::{OutcomeDecider, PaymentDecision};
use crate::details::PaymentDetails;
use crate::error::{PaymentError, Result};
use crate::method::{PaymentFees, PaymentMethod, ProcessingDelays};
use crate::state::PaymentStep;
use crate::validation;

/// Closes a [`PaymentGateway`] from outside, e.g. on teardown.
///
/// Closing while a payment is processing aborts it without an outcome.
#[derive(Debug, Clone)]
pub struct GatewayHandle {
    closed: Arc<watch::Sender<bool>>,
}

impl GatewayHandle {
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

/// One payment session for an order total.
///
/// The transaction ID is generated when the gateway opens and is kept across
/// retries.
pub struct PaymentGateway<D: OutcomeDecider> {
    order_total: Money,
    decider: D,
    fees: PaymentFees,
    delays: ProcessingDelays,
    transaction_id: TransactionId,
    step: PaymentStep,
    method: PaymentMethod,
    field_errors: FieldErrors,
    outcome: Option<PaymentOutcome>,
    closed: Arc<watch::Sender<bool>>,
}

impl<D: OutcomeDecider> PaymentGateway<D> {
    /// Opens a gateway on method selection with UPI preselected.
    pub fn open(order_total: Money, decider: D) -> (Self, GatewayHandle) {
        let (closed, _) = watch::channel(false);
        let closed = Arc::new(closed);
        let transaction_id = TransactionId::generate();
        tracing::info!(%transaction_id, %order_total, "payment gateway opened");

        let gateway = Self {
            order_total,
            decider,
            fees: PaymentFees::default(),
            delays: ProcessingDelays::default(),
            transaction_id,
            step: PaymentStep::Method,
            method: PaymentMethod::default(),
            field_errors: FieldErrors::new(),
            outcome: None,
            closed: Arc::clone(&closed),
        };
        (gateway, GatewayHandle { closed })
    }

    pub fn with_fees(mut self, fees: PaymentFees) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_delays(mut self, delays: ProcessingDelays) -> Self {
        self.delays = delays;
        self
    }

    // Query methods

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn step(&self) -> PaymentStep {
        self.step
    }

    pub fn selected_method(&self) -> PaymentMethod {
        self.method
    }

    pub fn order_total(&self) -> Money {
        self.order_total
    }

    /// Returns the surcharge of the selected method.
    pub fn fee(&self) -> Money {
        self.fees.fee_for(self.method)
    }

    /// Returns what the shopper pays with the selected method.
    pub fn charged_total(&self) -> Money {
        self.order_total + self.fee()
    }

    /// Returns the validation messages of the last rejected submission.
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// Returns the outcome of the last processing run.
    pub fn outcome(&self) -> Option<&PaymentOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    // Command methods

    /// Chooses a method. Only allowed on method selection.
    pub fn select_method(&mut self, method: PaymentMethod) -> Result<()> {
        self.ensure_open()?;
        self.ensure_step(PaymentStep::Method, "select a payment method")?;
        self.method = method;
        self.field_errors = FieldErrors::new();
        Ok(())
    }

    /// Validates the details, simulates processing and decides the outcome.
    ///
    /// A validation failure keeps the gateway on method selection with
    /// [`field_errors`](Self::field_errors) populated. A decline moves it to
    /// `Failure` and is returned as `Ok(PaymentOutcome::Failed)`.
    #[tracing::instrument(skip(self, details), fields(transaction_id = %self.transaction_id, method = %self.method))]
    pub async fn submit(&mut self, details: PaymentDetails) -> Result<PaymentOutcome> {
        self.ensure_open()?;
        self.ensure_step(PaymentStep::Method, "submit a payment")?;

        if details.method() != self.method {
            return Err(PaymentError::MethodMismatch {
                selected: self.method,
                provided: details.method(),
            });
        }

        if let Err(errors) = validation::validate(&details) {
            tracing::debug!(fields = %errors, "payment details rejected");
            self.field_errors = errors.clone();
            return Err(PaymentError::Validation(errors));
        }
        self.field_errors = FieldErrors::new();

        let method = self.method;
        let charged = self.charged_total();
        let delay = self.delays.delay_for(method);
        let closed = self.closed.subscribe();

        let processing = Processing::begin(&mut self.step);
        metrics::counter!("payment_attempts_total", "method" => method.as_str()).increment(1);
        let started = Instant::now();

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = wait_closed(closed) => {
                tracing::info!("payment gateway closed during processing");
                processing.finish(PaymentStep::Cancelled);
                return Err(PaymentError::Closed);
            }
        }
        metrics::histogram!("payment_processing_seconds", "method" => method.as_str())
            .record(started.elapsed().as_secs_f64());

        let outcome = match self.decider.decide(method) {
            PaymentDecision::Approve => {
                let attempt =
                    PaymentAttempt::approved(self.transaction_id.clone(), method, charged);
                tracing::info!(status = %attempt.status, amount = %attempt.amount, "payment approved");
                processing.finish(PaymentStep::Success);
                PaymentOutcome::Succeeded(attempt)
            }
            PaymentDecision::Decline => {
                tracing::warn!("payment declined");
                processing.finish(PaymentStep::Failure);
                PaymentOutcome::Failed(PaymentFailure::declined(self.transaction_id.clone(), method))
            }
        };
        metrics::counter!(
            "payment_outcomes_total",
            "method" => method.as_str(),
            "success" => if outcome.is_success() { "true" } else { "false" }
        )
        .increment(1);

        self.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Returns from a decline to method selection, keeping the transaction ID.
    pub fn retry(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.ensure_step(PaymentStep::Failure, "retry a payment")?;
        self.step = PaymentStep::Method;
        self.outcome = None;
        self.field_errors = FieldErrors::new();
        Ok(())
    }

    /// Backs out of the payment. Only allowed on method selection.
    pub fn cancel(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.ensure_step(PaymentStep::Method, "cancel a payment")?;
        self.step = PaymentStep::Cancelled;
        tracing::info!(transaction_id = %self.transaction_id, "payment cancelled");
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(PaymentError::Closed);
        }
        Ok(())
    }

    fn ensure_step(&self, expected: PaymentStep, operation: &'static str) -> Result<()> {
        if self.step != expected {
            return Err(PaymentError::InvalidStep {
                operation,
                step: self.step,
            });
        }
        Ok(())
    }
}

/// Holds the gateway in `Processing` for one submission.
///
/// Dropped without [`finish`](Self::finish), e.g. when the submitting future
/// is abandoned, it returns the gateway to method selection.
struct Processing<'a> {
    step: &'a mut PaymentStep,
    finished: bool,
}

impl<'a> Processing<'a> {
    fn begin(step: &'a mut PaymentStep) -> Self {
        *step = PaymentStep::Processing;
        Self {
            step,
            finished: false,
        }
    }

    fn finish(mut self, step: PaymentStep) {
        *self.step = step;
        self.finished = true;
    }
}

impl Drop for Processing<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::info!("payment processing abandoned, back to method selection");
            *self.step = PaymentStep::Method;
        }
    }
}

async fn wait_closed(mut closed: watch::Receiver<bool>) {
    let _ = closed.wait_for(|closed| *closed).await;
}
