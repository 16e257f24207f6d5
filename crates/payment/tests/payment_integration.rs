//! Integration tests for the payment gateway.

use std::time::Duration;

use common::Money;
use payment::{
    CardDetails, FixedDecider, PaymentDecision, PaymentDetails, PaymentError, PaymentFees,
    PaymentGateway, PaymentMethod, PaymentOutcome, PaymentStatus, PaymentStep, ProcessingDelays,
    ScriptedDecider,
};
use tokio::time::Instant;

fn assert_elapsed(started: Instant, secs: u64) {
    let elapsed = started.elapsed();
    assert!(
        elapsed >= Duration::from_secs(secs) && elapsed < Duration::from_secs(secs + 1),
        "expected about {secs}s, got {elapsed:?}"
    );
}

fn valid_card() -> CardDetails {
    CardDetails::new("1234 5678 9012 3456", "09/26", "123", "Asha Rao")
}

mod processing {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_upi_scenario_rejects_then_succeeds() {
        let (mut gw, _handle) = PaymentGateway::open(Money::from_rupees(300), FixedDecider::approve());

        let err = gw.submit(PaymentDetails::upi("bad-id")).await.unwrap_err();
        assert!(matches!(err, PaymentError::Validation(_)));
        assert_eq!(gw.step(), PaymentStep::Method);

        let started = Instant::now();
        let outcome = gw.submit(PaymentDetails::upi("user@bank")).await.unwrap();
        assert_elapsed(started, 3);

        let PaymentOutcome::Succeeded(attempt) = outcome else {
            panic!("expected success");
        };
        assert_eq!(attempt.status, PaymentStatus::Completed);
        assert_eq!(attempt.method, PaymentMethod::Upi);
        assert_eq!(&attempt.transaction_id, gw.transaction_id());
        assert_eq!(gw.step(), PaymentStep::Success);
        assert!(gw.field_errors().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_method_delays() {
        let cases = [
            (PaymentMethod::Card, Some(PaymentDetails::card(valid_card())), 5),
            (PaymentMethod::Cod, None, 1),
            (PaymentMethod::NetBanking, None, 4),
            (PaymentMethod::Wallet, None, 4),
        ];

        for (method, details, secs) in cases {
            let (mut gw, _handle) = PaymentGateway::open(Money::from_rupees(1), FixedDecider::approve());
            gw.select_method(method).unwrap();
            let details = details
                .or_else(|| PaymentDetails::empty_for(method))
                .unwrap();

            let started = Instant::now();
            gw.submit(details).await.unwrap();
            assert_elapsed(started, secs);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cod_success_is_pending_with_fee() {
        let (mut gw, _handle) = PaymentGateway::open(Money::from_rupees(1000), FixedDecider::approve());
        gw.select_method(PaymentMethod::Cod).unwrap();

        let outcome = gw.submit(PaymentDetails::Cod).await.unwrap();
        let PaymentOutcome::Succeeded(attempt) = outcome else {
            panic!("expected success");
        };
        assert_eq!(attempt.status, PaymentStatus::Pending);
        assert_eq!(attempt.amount, Money::from_rupees(1025));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_fee_table() {
        let (gw, _handle) = PaymentGateway::open(Money::from_rupees(100), FixedDecider::approve());
        let mut gw = gw.with_fees(PaymentFees::none().with_fee(PaymentMethod::Wallet, Money::from_rupees(5)));
        gw.select_method(PaymentMethod::Cod).unwrap();
        assert_eq!(gw.charged_total(), Money::from_rupees(100));
        gw.select_method(PaymentMethod::Wallet).unwrap();
        assert_eq!(gw.charged_total(), Money::from_rupees(105));
    }
}

mod card_validation {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_short_card_number_rejected() {
        let (mut gw, _handle) = PaymentGateway::open(Money::from_rupees(1), FixedDecider::approve());
        gw.select_method(PaymentMethod::Card).unwrap();

        let card = CardDetails::new("1234 5678 9012", "09/26", "123", "Asha Rao");
        let err = gw.submit(PaymentDetails::card(card)).await.unwrap_err();
        let PaymentError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains("number"));
        assert!(gw.field_errors().contains("number"));
        assert_eq!(gw.step(), PaymentStep::Method);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_expiry_rejected_then_fixed() {
        let (mut gw, _handle) = PaymentGateway::open(Money::from_rupees(1), FixedDecider::approve());
        gw.select_method(PaymentMethod::Card).unwrap();

        let mut card = valid_card();
        card.expiry = "13/25".into();
        assert!(gw.submit(PaymentDetails::card(card.clone())).await.is_err());
        assert!(gw.field_errors().contains("expiry"));

        card.expiry = "09/26".into();
        assert!(gw.submit(PaymentDetails::card(card)).await.unwrap().is_success());
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_close_mid_processing_yields_no_outcome() {
        let (mut gw, handle) = PaymentGateway::open(Money::from_rupees(1), FixedDecider::approve());

        let task = tokio::spawn(async move {
            let result = gw.submit(PaymentDetails::upi("user@bank")).await;
            (gw, result)
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.close();

        let (gw, result) = task.await.unwrap();
        assert_eq!(result, Err(PaymentError::Closed));
        assert!(gw.outcome().is_none());
        assert_eq!(gw.step(), PaymentStep::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_submission_can_be_resubmitted() {
        let (mut gw, _handle) = PaymentGateway::open(Money::from_rupees(449), FixedDecider::approve());
        let txn = gw.transaction_id().clone();

        let timed_out = tokio::time::timeout(
            Duration::from_millis(100),
            gw.submit(PaymentDetails::upi("user@bank")),
        )
        .await;
        assert!(timed_out.is_err());
        assert_eq!(gw.step(), PaymentStep::Method);
        assert!(gw.outcome().is_none());

        let outcome = gw.submit(PaymentDetails::upi("user@bank")).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.transaction_id(), &txn);
        assert_eq!(gw.step(), PaymentStep::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transaction_id_stable_across_retries() {
        let decider = ScriptedDecider::new([PaymentDecision::Decline, PaymentDecision::Decline]);
        let (mut gw, _handle) = PaymentGateway::open(Money::from_rupees(10), decider.clone());
        let txn = gw.transaction_id().clone();

        for _ in 0..2 {
            let outcome = gw.submit(PaymentDetails::upi("user@bank")).await.unwrap();
            assert!(!outcome.is_success());
            assert_eq!(outcome.transaction_id(), &txn);
            gw.retry().unwrap();
        }

        let outcome = gw.submit(PaymentDetails::upi("user@bank")).await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.transaction_id(), &txn);
        assert_eq!(decider.remaining(), 0);
    }

    #[test]
    fn test_reopening_generates_new_transaction_id() {
        let (first, _) = PaymentGateway::open(Money::from_rupees(10), FixedDecider::approve());
        let (second, _) = PaymentGateway::open(Money::from_rupees(10), FixedDecider::approve());
        assert_ne!(first.transaction_id(), second.transaction_id());
    }

    #[tokio::test]
    async fn test_instant_delays() {
        let (gw, _handle) = PaymentGateway::open(Money::from_rupees(10), FixedDecider::decline());
        let mut gw = gw.with_delays(ProcessingDelays::instant());
        let outcome = gw.submit(PaymentDetails::upi("user@bank")).await.unwrap();
        assert!(!outcome.is_success());
        assert_eq!(gw.step(), PaymentStep::Failure);
    }
}
