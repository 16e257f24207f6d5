//! Deciding whether a simulated payment goes through.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rand::Rng;

use crate::method::PaymentMethod;

/// Success rate of [`RandomDecider::default`].
pub const DEFAULT_SUCCESS_RATE: f64 = 0.9;

/// What the simulated processor answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentDecision {
    Approve,
    Decline,
}

/// Decides the outcome of a processing run.
pub trait OutcomeDecider: Send + Sync {
    fn decide(&self, method: PaymentMethod) -> PaymentDecision;
}

impl<D: OutcomeDecider + ?Sized> OutcomeDecider for Arc<D> {
    fn decide(&self, method: PaymentMethod) -> PaymentDecision {
        (**self).decide(method)
    }
}

/// Approves with a fixed probability.
#[derive(Debug, Clone, Copy)]
pub struct RandomDecider {
    success_rate: f64,
}

impl RandomDecider {
    /// Creates a decider; the rate is clamped into `0.0..=1.0`.
    pub fn new(success_rate: f64) -> Self {
        let success_rate = if success_rate.is_nan() {
            DEFAULT_SUCCESS_RATE
        } else {
            success_rate.clamp(0.0, 1.0)
        };
        Self { success_rate }
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }
}

impl Default for RandomDecider {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_RATE)
    }
}

impl OutcomeDecider for RandomDecider {
    fn decide(&self, _method: PaymentMethod) -> PaymentDecision {
        if rand::thread_rng().gen_bool(self.success_rate) {
            PaymentDecision::Approve
        } else {
            PaymentDecision::Decline
        }
    }
}

/// Always answers the same.
#[derive(Debug, Clone, Copy)]
pub struct FixedDecider(pub PaymentDecision);

impl FixedDecider {
    pub fn approve() -> Self {
        Self(PaymentDecision::Approve)
    }

    pub fn decline() -> Self {
        Self(PaymentDecision::Decline)
    }
}

impl OutcomeDecider for FixedDecider {
    fn decide(&self, _method: PaymentMethod) -> PaymentDecision {
        self.0
    }
}

/// Answers from a queue, then approves once the queue is empty.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecider {
    script: Arc<Mutex<VecDeque<PaymentDecision>>>,
}

impl ScriptedDecider {
    pub fn new(decisions: impl IntoIterator<Item = PaymentDecision>) -> Self {
        Self {
            script: Arc::new(Mutex::new(decisions.into_iter().collect())),
        }
    }

    /// Returns how many scripted answers are left.
    pub fn remaining(&self) -> usize {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl OutcomeDecider for ScriptedDecider {
    fn decide(&self, _method: PaymentMethod) -> PaymentDecision {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or(PaymentDecision::Approve)
    }
}
