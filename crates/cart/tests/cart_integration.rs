//! Integration tests for the cart engine.

use std::sync::Arc;

use cart::{
    CartEngine, CartError, CartItem, CartSnapshot, Coupon, CouponCatalog, DEFAULT_CART_KEY,
    InMemoryCartRemote, InMemoryStore, JsonFileStore, LoadSource, ProductListing, RemoteCall,
};
use common::{Money, NoticeLevel, ProductId, RecordingNotifier};

type TestEngine = CartEngine<InMemoryCartRemote, InMemoryStore>;

struct TestHarness {
    engine: Arc<TestEngine>,
    remote: InMemoryCartRemote,
    store: InMemoryStore,
    notifier: RecordingNotifier,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_catalog(CouponCatalog::default())
    }

    fn with_catalog(catalog: CouponCatalog) -> Self {
        let remote = InMemoryCartRemote::new();
        let store = InMemoryStore::new();
        let notifier = RecordingNotifier::new();
        let engine = CartEngine::new(remote.clone(), store.clone())
            .with_catalog(catalog)
            .with_notifier(Arc::new(notifier.clone()));

        Self {
            engine: Arc::new(engine),
            remote,
            store,
            notifier,
        }
    }

    async fn stored_snapshot(&self) -> Option<CartSnapshot> {
        self.store
            .raw(DEFAULT_CART_KEY)
            .await
            .map(|json| CartSnapshot::from_json(&json).unwrap())
    }

    async fn assert_totals_consistent(&self) {
        let state = self.engine.state().await;
        let items: u32 = state.items().iter().map(|i| i.quantity).sum();
        let amount: Money = state.items().iter().map(CartItem::line_total).sum();
        assert_eq!(state.total_items(), items);
        assert_eq!(state.total_amount(), amount);
    }
}

fn listing(id: &str, rupees: i64) -> ProductListing {
    ProductListing::new(id, format!("Product {id}"), Money::from_rupees(rupees))
}

fn id(s: &str) -> ProductId {
    ProductId::new(s)
}

mod merging {
    use super::*;

    #[tokio::test]
    async fn test_repeated_adds_merge_into_one_line() {
        let h = TestHarness::new();
        let a = listing("a", 10);

        for q in [1, 2, 3] {
            h.engine.add_item(&a, q).await.unwrap();
        }

        let items = h.engine.items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 6);
        h.assert_totals_consistent().await;
    }

    #[tokio::test]
    async fn test_concurrent_adds_of_same_item_are_all_observed() {
        let h = TestHarness::new();
        let a = listing("a", 10);

        let (r1, r2) = tokio::join!(h.engine.add_item(&a, 2), h.engine.add_item(&a, 3));
        r1.unwrap();
        r2.unwrap();

        assert_eq!(h.engine.items().await.len(), 1);
        assert_eq!(h.engine.item_quantity(&id("a")).await, 5);
    }

    #[tokio::test]
    async fn test_spawned_adds_from_many_tasks() {
        let h = TestHarness::new();
        let mut handles = Vec::new();
        for _ in 0..5 {
            let engine = Arc::clone(&h.engine);
            handles.push(tokio::spawn(async move {
                engine.add_item(&listing("a", 10), 1).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(h.engine.item_quantity(&id("a")).await, 5);
        h.assert_totals_consistent().await;
    }

    #[tokio::test]
    async fn test_merge_clamps_at_stock() {
        let h = TestHarness::new();
        let a = listing("a", 10).with_stock(3);
        h.engine.add_item(&a, 2).await.unwrap();
        h.engine.add_item(&a, 2).await.unwrap();
        assert_eq!(h.engine.item_quantity(&id("a")).await, 3);
    }
}

mod quantities {
    use super::*;

    #[tokio::test]
    async fn test_update_to_zero_or_negative_equals_remove() {
        for q in [0, -1] {
            let h = TestHarness::new();
            h.engine.add_item(&listing("a", 100), 2).await.unwrap();
            h.engine.add_item(&listing("b", 50), 1).await.unwrap();

            h.engine.update_quantity(&id("a"), q).await.unwrap();

            let reference = TestHarness::new();
            reference.engine.add_item(&listing("a", 100), 2).await.unwrap();
            reference.engine.add_item(&listing("b", 50), 1).await.unwrap();
            reference.engine.remove_item(&id("a")).await.unwrap();

            assert_eq!(h.engine.items().await, reference.engine.items().await);
            assert_eq!(h.engine.summary().await, reference.engine.summary().await);
            assert_eq!(
                h.remote.calls().await.last(),
                Some(&RemoteCall::Remove { item_id: id("a") })
            );
        }
    }

    #[tokio::test]
    async fn test_totals_track_every_mutation() {
        let h = TestHarness::new();
        h.engine.add_item(&listing("a", 120), 1).await.unwrap();
        h.assert_totals_consistent().await;
        h.engine.add_item(&listing("b", 35), 4).await.unwrap();
        h.assert_totals_consistent().await;
        h.engine.update_quantity(&id("a"), 3).await.unwrap();
        h.assert_totals_consistent().await;
        h.engine.remove_item(&id("b")).await.unwrap();
        h.assert_totals_consistent().await;

        assert_eq!(h.engine.total_amount().await, Money::from_rupees(360));
    }

    #[tokio::test]
    async fn test_update_unknown_item_is_rejected() {
        let h = TestHarness::new();
        let err = h.engine.update_quantity(&id("ghost"), 2).await.unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound { .. }));
        assert_eq!(h.notifier.messages(NoticeLevel::Error).len(), 1);
    }

    #[tokio::test]
    async fn test_negative_price_is_rejected() {
        let h = TestHarness::new();
        let bad = ProductListing::new("x", "Broken listing", Money::from_paise(-100));

        let err = h.engine.add_item(&bad, 1).await.unwrap_err();
        assert!(matches!(err, CartError::InvalidPrice { .. }));
        assert!(h.engine.state().await.is_empty());
        assert_eq!(h.engine.total_amount().await, Money::zero());
        assert!(h.remote.calls().await.is_empty());
        assert!(h.store.raw(DEFAULT_CART_KEY).await.is_none());
    }

    #[tokio::test]
    async fn test_add_zero_quantity_is_rejected() {
        let h = TestHarness::new();
        let err = h.engine.add_item(&listing("a", 1), 0).await.unwrap_err();
        assert_eq!(err, CartError::InvalidQuantity { quantity: 0 });
        assert!(h.engine.items().await.is_empty());
    }
}

mod coupons {
    use super::*;

    #[tokio::test]
    async fn test_coupon_below_minimum_leaves_cart_unchanged() {
        let h = TestHarness::new();
        h.engine.add_item(&listing("a", 499), 1).await.unwrap();
        let before = h.stored_snapshot().await;

        let err = h.engine.apply_coupon("FIRST25").await.unwrap_err();
        assert!(matches!(err, CartError::CouponMinimumNotMet { .. }));

        let state = h.engine.state().await;
        assert!(state.applied_coupon().is_none());
        assert_eq!(state.discount(), Money::zero());
        assert!(state.error().is_some());
        assert_eq!(h.stored_snapshot().await, before);
    }

    #[tokio::test]
    async fn test_coupon_at_minimum_applies_exact_discount() {
        let h = TestHarness::new();
        h.engine.add_item(&listing("a", 500), 1).await.unwrap();

        h.engine.apply_coupon(" first25 ").await.unwrap();

        let summary = h.engine.summary().await;
        assert_eq!(summary.discount, Money::from_rupees(125));
        assert_eq!(summary.total, Money::from_rupees(375));
        assert_eq!(
            summary.applied_coupon.map(|c| c.code),
            Some("FIRST25".to_string())
        );
        assert!(matches!(
            h.remote.calls().await.last(),
            Some(RemoteCall::ApplyCoupon { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_coupon_is_rejected() {
        let h = TestHarness::new();
        h.engine.add_item(&listing("a", 5000), 1).await.unwrap();
        let err = h.engine.apply_coupon("NOPE").await.unwrap_err();
        assert!(matches!(err, CartError::UnknownCoupon { .. }));
    }

    #[tokio::test]
    async fn test_remove_coupon_clears_discount_and_persists() {
        let h = TestHarness::new();
        h.engine.add_item(&listing("a", 2000), 1).await.unwrap();
        h.engine.apply_coupon("BHARATSHAALA10").await.unwrap();
        assert_eq!(
            h.stored_snapshot().await.unwrap().discount,
            Money::from_rupees(200)
        );

        h.engine.remove_coupon().await.unwrap();
        let snapshot = h.stored_snapshot().await.unwrap();
        assert!(snapshot.applied_coupon.is_none());
        assert_eq!(snapshot.discount, Money::zero());
    }

    #[tokio::test]
    async fn test_total_never_negative() {
        let h = TestHarness::with_catalog(CouponCatalog::new(vec![Coupon::new(
            "ALL",
            100,
            Money::zero(),
        )]));
        h.engine.add_item(&listing("a", 100), 1).await.unwrap();
        h.engine.apply_coupon("ALL").await.unwrap();
        h.engine.update_quantity(&id("a"), 1).await.unwrap();
        h.engine.remove_item(&id("a")).await.unwrap();

        let summary = h.engine.summary().await;
        assert_eq!(summary.discount, Money::from_rupees(100));
        assert_eq!(summary.total, Money::zero());
    }
}

mod persistence {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_written_after_every_mutation() {
        let h = TestHarness::new();
        h.engine.add_item(&listing("a", 100), 1).await.unwrap();
        assert_eq!(h.stored_snapshot().await.unwrap().total_items, 1);

        h.engine.update_quantity(&id("a"), 4).await.unwrap();
        assert_eq!(h.stored_snapshot().await.unwrap().total_items, 4);

        h.engine.remove_item(&id("a")).await.unwrap();
        assert!(h.stored_snapshot().await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_load_prefers_remote() {
        let h = TestHarness::new();
        h.remote
            .seed(
                vec![listing("r", 70).to_cart_item(2)],
                Money::from_rupees(40),
            )
            .await;

        assert_eq!(h.engine.load().await.unwrap(), LoadSource::Remote);
        let state = h.engine.state().await;
        assert!(!state.is_loading());
        assert_eq!(state.total_amount(), Money::from_rupees(140));
        assert_eq!(state.shipping_cost(), Money::from_rupees(40));
    }

    #[tokio::test]
    async fn test_load_falls_back_to_snapshot_when_offline() {
        let h = TestHarness::new();
        h.engine.add_item(&listing("a", 100), 2).await.unwrap();
        h.remote.set_offline(true);

        let fresh = CartEngine::new(h.remote.clone(), h.store.clone());
        assert_eq!(fresh.load().await.unwrap(), LoadSource::Snapshot);
        assert_eq!(fresh.item_quantity(&id("a")).await, 2);
        assert!(!fresh.state().await.is_loading());
    }

    #[tokio::test]
    async fn test_load_with_nothing_anywhere_is_empty() {
        let h = TestHarness::new();
        h.remote.set_offline(true);
        assert_eq!(h.engine.load().await.unwrap(), LoadSource::Empty);
        assert!(h.engine.state().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_sets_error() {
        let h = TestHarness::new();
        h.remote.set_offline(true);
        h.store.put_raw(DEFAULT_CART_KEY, "{not json").await;

        let err = h.engine.load().await.unwrap_err();
        assert!(matches!(err, CartError::Load(_)));

        let state = h.engine.state().await;
        assert!(!state.is_loading());
        assert!(state.error().is_some());
    }

    #[tokio::test]
    async fn test_load_recomputes_stale_totals() {
        let h = TestHarness::new();
        h.remote.set_offline(true);
        let snapshot = CartSnapshot {
            items: vec![listing("a", 100).to_cart_item(3)],
            total_items: 1,
            total_amount: Money::from_rupees(1),
            ..Default::default()
        };
        h.store
            .put_raw(DEFAULT_CART_KEY, snapshot.to_json().unwrap())
            .await;

        h.engine.load().await.unwrap();
        h.assert_totals_consistent().await;
        assert_eq!(h.engine.total_amount().await, Money::from_rupees(300));
    }

    #[tokio::test]
    async fn test_clear_purges_storage_and_remote() {
        let h = TestHarness::new();
        h.engine.add_item(&listing("a", 100), 1).await.unwrap();

        h.engine.clear().await.unwrap();

        assert!(h.engine.state().await.is_empty());
        assert!(h.store.raw(DEFAULT_CART_KEY).await.is_none());
        assert!(h.remote.items().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_overwrites_snapshot_when_removal_fails() {
        let h = TestHarness::new();
        h.engine.add_item(&listing("a", 100), 2).await.unwrap();
        h.store.set_fail_on_remove(true);

        h.engine.clear().await.unwrap();
        assert!(h.engine.state().await.is_empty());
        assert!(h.stored_snapshot().await.unwrap().items.is_empty());

        h.remote.set_offline(true);
        let reloaded = CartEngine::new(h.remote.clone(), h.store.clone());
        assert_eq!(reloaded.load().await.unwrap(), LoadSource::Snapshot);
        assert!(reloaded.state().await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_reports_snapshot_left_behind() {
        let h = TestHarness::new();
        h.engine.add_item(&listing("a", 100), 1).await.unwrap();
        h.store.set_fail_on_write(true);

        let err = h.engine.clear().await.unwrap_err();
        assert!(matches!(err, CartError::SnapshotNotCleared(_)));
        assert!(h.engine.state().await.is_empty());
        assert!(h.remote.items().await.is_empty());
        assert_eq!(h.notifier.messages(NoticeLevel::Error).len(), 1);
    }

    #[tokio::test]
    async fn test_load_drops_lines_with_bad_price_or_quantity() {
        let h = TestHarness::new();
        h.remote.set_offline(true);
        let mut negative = listing("neg", 10).to_cart_item(1);
        negative.price = Money::from_rupees(-10);
        let snapshot = CartSnapshot {
            items: vec![
                listing("a", 100).to_cart_item(1),
                negative,
                listing("zero", 10).to_cart_item(0),
            ],
            ..Default::default()
        };
        h.store
            .put_raw(DEFAULT_CART_KEY, snapshot.to_json().unwrap())
            .await;

        h.engine.load().await.unwrap();
        let items = h.engine.items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id("a"));
        assert_eq!(h.engine.total_amount().await, Money::from_rupees(100));
    }

    #[tokio::test]
    async fn test_json_file_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let remote = InMemoryCartRemote::offline();

        let engine = CartEngine::new(remote.clone(), JsonFileStore::new(dir.path()));
        engine.add_item(&listing("a", 250), 2).await.unwrap();
        drop(engine);

        let restarted = CartEngine::new(remote, JsonFileStore::new(dir.path()));
        assert_eq!(restarted.load().await.unwrap(), LoadSource::Snapshot);
        assert_eq!(restarted.total_amount().await, Money::from_rupees(500));
    }
}

mod responsiveness {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use cart::{CartRemote, CouponResponse, RemoteError};

    /// In-memory remote that answers every write after a fixed delay.
    #[derive(Clone)]
    struct SlowRemote {
        inner: InMemoryCartRemote,
        delay: Duration,
    }

    impl SlowRemote {
        fn new(delay: Duration) -> Self {
            Self {
                inner: InMemoryCartRemote::new(),
                delay,
            }
        }
    }

    #[async_trait]
    impl CartRemote for SlowRemote {
        async fn load(&self) -> Result<CartSnapshot, RemoteError> {
            tokio::time::sleep(self.delay).await;
            self.inner.load().await
        }

        async fn add(&self, item: &CartItem, quantity: u32) -> Result<(), RemoteError> {
            tokio::time::sleep(self.delay).await;
            self.inner.add(item, quantity).await
        }

        async fn update(&self, item_id: &ProductId, quantity: u32) -> Result<(), RemoteError> {
            tokio::time::sleep(self.delay).await;
            self.inner.update(item_id, quantity).await
        }

        async fn remove(&self, item_id: &ProductId) -> Result<(), RemoteError> {
            tokio::time::sleep(self.delay).await;
            self.inner.remove(item_id).await
        }

        async fn apply_coupon(
            &self,
            coupon_code: &str,
            total_amount: Money,
        ) -> Result<CouponResponse, RemoteError> {
            tokio::time::sleep(self.delay).await;
            self.inner.apply_coupon(coupon_code, total_amount).await
        }

        async fn clear(&self) -> Result<(), RemoteError> {
            tokio::time::sleep(self.delay).await;
            self.inner.clear().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_queries_answer_while_remote_write_in_flight() {
        let remote = SlowRemote::new(Duration::from_secs(3));
        let store = InMemoryStore::new();
        let engine = Arc::new(CartEngine::new(remote.clone(), store.clone()));

        let adding = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move { engine.add_item(&listing("a", 100), 1).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let summary = tokio::time::timeout(Duration::from_millis(300), engine.summary())
            .await
            .expect("summary waited on the remote");
        assert_eq!(summary.item_count, 1);
        assert!(engine.is_item_in_cart(&id("a")).await);
        assert!(store.raw(DEFAULT_CART_KEY).await.is_some());
        assert!(remote.inner.calls().await.is_empty());

        adding.await.unwrap().unwrap();
        assert_eq!(remote.inner.calls().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_writes_follow_transition_order() {
        let remote = SlowRemote::new(Duration::from_secs(1));
        let engine = Arc::new(CartEngine::new(remote.clone(), InMemoryStore::new()));

        let add_a = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move { engine.add_item(&listing("a", 100), 1).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        let add_b = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move { engine.add_item(&listing("b", 50), 2).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        let remove_a = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move { engine.remove_item(&id("a")).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let items = engine.items().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id("b"));

        for task in [add_a, add_b, remove_a] {
            task.await.unwrap().unwrap();
        }
        assert_eq!(
            remote.inner.calls().await,
            vec![
                RemoteCall::Add {
                    item_id: id("a"),
                    quantity: 1
                },
                RemoteCall::Add {
                    item_id: id("b"),
                    quantity: 2
                },
                RemoteCall::Remove { item_id: id("a") },
            ]
        );
    }
}

mod offline {
    use super::*;

    #[tokio::test]
    async fn test_offline_remote_does_not_change_results() {
        let online = TestHarness::new();
        let offline = TestHarness::new();
        offline.remote.set_offline(true);

        for h in [&online, &offline] {
            h.engine.add_item(&listing("a", 300), 1).await.unwrap();
            h.engine.add_item(&listing("b", 400), 1).await.unwrap();
            h.engine.apply_coupon("FIRST25").await.unwrap();
            h.engine.update_quantity(&id("b"), 2).await.unwrap();
        }

        assert_eq!(online.engine.state().await, offline.engine.state().await);
        assert!(offline.notifier.messages(NoticeLevel::Error).is_empty());
        assert!(offline.remote.items().await.is_empty());
        assert_eq!(online.remote.items().await.len(), 2);
    }
}

#[tokio::test]
async fn test_add_merge_coupon_remove_scenario() {
    let h = TestHarness::with_catalog(CouponCatalog::new(vec![Coupon::new(
        "TEN",
        10,
        Money::from_rupees(200),
    )]));
    let a = listing("a", 100);

    assert!(h.engine.state().await.is_empty());
    h.engine.add_item(&a, 1).await.unwrap();
    h.engine.add_item(&a, 2).await.unwrap();

    let items = h.engine.items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
    assert_eq!(h.engine.total_amount().await, Money::from_rupees(300));

    h.engine.apply_coupon("TEN").await.unwrap();
    assert_eq!(h.engine.summary().await.discount, Money::from_rupees(30));

    h.engine.remove_item(&id("a")).await.unwrap();
    let state = h.engine.state().await;
    assert!(state.is_empty());
    assert_eq!(state.total_items(), 0);
    assert_eq!(state.total_amount(), Money::zero());
    // The coupon stays applied with its frozen discount.
    assert!(state.applied_coupon().is_some());
    assert_eq!(state.discount(), Money::from_rupees(30));
    assert_eq!(h.engine.summary().await.total, Money::zero());
}
