//! Cart service object: the single owner of [`CartState`].

use std::collections::VecDeque;
use std::sync::Arc;

use common::{Money, Notifier, ProductId, TracingNotifier};
use tokio::sync::{Mutex, MutexGuard};

use crate::coupon::CouponCatalog;
use crate::error::{CartError, RemoteError, Result};
use crate::item::{CartItem, ProductListing};
use crate::remote::CartRemote;
use crate::snapshot::CartSnapshot;
use crate::state::{CartAction, CartState};
use crate::storage::{DEFAULT_CART_KEY, KeyValueStore};
use crate::summary::CartSummary;

/// Result of a successful cart command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartOutcome {
    /// User-facing confirmation.
    pub message: String,
}

impl CartOutcome {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Where a successful load got its contents from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    Snapshot,
    Empty,
}

/// A remote write queued behind its local transition.
#[derive(Debug, Clone)]
enum RemoteWrite {
    Add { item: CartItem },
    Update { id: ProductId, quantity: u32 },
    Remove { id: ProductId },
    ApplyCoupon { code: String, subtotal: Money },
    Clear,
}

impl RemoteWrite {
    fn operation(&self) -> &'static str {
        match self {
            RemoteWrite::Add { .. } => "add",
            RemoteWrite::Update { .. } => "update",
            RemoteWrite::Remove { .. } => "remove",
            RemoteWrite::ApplyCoupon { .. } => "apply_coupon",
            RemoteWrite::Clear => "clear",
        }
    }
}

/// Applies cart intents, persists a snapshot with every transition and
/// syncs each change to the remote service.
///
/// The state lock covers only applying and persisting a transition, so
/// queries never wait on the network. Remote writes are queued in transition
/// order and sent one at a time after the lock is released; a command
/// returns once its own write has been sent.
pub struct CartEngine<R, S>
where
    R: CartRemote,
    S: KeyValueStore,
{
    state: Mutex<CartState>,
    pending: Mutex<VecDeque<RemoteWrite>>,
    sync_turn: Mutex<()>,
    remote: R,
    store: S,
    catalog: CouponCatalog,
    storage_key: String,
    notifier: Arc<dyn Notifier>,
}

impl<R, S> CartEngine<R, S>
where
    R: CartRemote,
    S: KeyValueStore,
{
    /// Creates an engine with an empty cart, the default coupon catalog and
    /// the default storage key.
    pub fn new(remote: R, store: S) -> Self {
        Self {
            state: Mutex::new(CartState::default()),
            pending: Mutex::new(VecDeque::new()),
            sync_turn: Mutex::new(()),
            remote,
            store,
            catalog: CouponCatalog::default(),
            storage_key: DEFAULT_CART_KEY.to_string(),
            notifier: Arc::new(TracingNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_catalog(mut self, catalog: CouponCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Returns the remote client.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Returns the local store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the key the snapshot is stored under.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Loads the cart from the remote service, falling back to the local
    /// snapshot and finally to an empty cart.
    ///
    /// The state reads as loading while the remote is queried.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> Result<LoadSource> {
        self.state.lock().await.apply(CartAction::Loading);
        let fetched = self.remote.load().await;

        let mut state = self.state.lock().await;
        match fetched {
            Ok(snapshot) => {
                tracing::info!(items = snapshot.items.len(), "cart loaded from remote");
                state.apply(CartAction::Loaded(snapshot));
                return Ok(LoadSource::Remote);
            }
            Err(e) => {
                tracing::warn!(error = %e, "remote cart load failed, using local snapshot");
                metrics::counter!("cart_remote_sync_failures_total", "operation" => "load")
                    .increment(1);
            }
        }

        match self.read_snapshot().await {
            Ok(Some(snapshot)) => {
                tracing::info!(items = snapshot.items.len(), "cart loaded from local snapshot");
                state.apply(CartAction::Loaded(snapshot));
                Ok(LoadSource::Snapshot)
            }
            Ok(None) => {
                state.apply(CartAction::Loaded(CartSnapshot::default()));
                Ok(LoadSource::Empty)
            }
            Err(message) => {
                tracing::error!(error = %message, "local cart snapshot unreadable");
                state.apply(CartAction::LoadFailed(message.clone()));
                Err(CartError::Load(message))
            }
        }
    }

    /// Adds `quantity` units of a listing, merging into an existing line.
    #[tracing::instrument(skip(self, listing), fields(product_id = %listing.id))]
    pub async fn add_item(&self, listing: &ProductListing, quantity: u32) -> Result<CartOutcome> {
        let mut state = self.state.lock().await;
        let action = self.decide(&mut state, |s| s.add_item(listing, quantity))?;

        let write = match &action {
            CartAction::ItemAdded(item) => Some(RemoteWrite::Add { item: item.clone() }),
            CartAction::QuantityUpdated { id, quantity } => Some(RemoteWrite::Update {
                id: id.clone(),
                quantity: *quantity,
            }),
            _ => None,
        };
        state.apply(action);
        self.persist(&state).await;

        let outcome = CartOutcome::new(format!("{} added to cart", listing.name));
        self.notifier.success(&outcome.message);
        self.sync_released(state, write).await;
        Ok(outcome)
    }

    /// Sets a line's quantity. Zero or below removes the line.
    #[tracing::instrument(skip(self))]
    pub async fn update_quantity(&self, id: &ProductId, new_quantity: i64) -> Result<CartOutcome> {
        let mut state = self.state.lock().await;
        let action = self.decide(&mut state, |s| s.update_quantity(id, new_quantity))?;

        let outcome = match action {
            CartAction::ItemRemoved { .. } => self.remove_line(state, id).await,
            CartAction::QuantityUpdated { id: _, quantity } => {
                state.apply(CartAction::QuantityUpdated {
                    id: id.clone(),
                    quantity,
                });
                self.persist(&state).await;
                let write = RemoteWrite::Update {
                    id: id.clone(),
                    quantity,
                };
                self.sync_released(state, Some(write)).await;
                CartOutcome::new("Cart updated")
            }
            other => {
                state.apply(other);
                CartOutcome::new("Cart updated")
            }
        };
        Ok(outcome)
    }

    /// Removes a line.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, id: &ProductId) -> Result<CartOutcome> {
        let mut state = self.state.lock().await;
        self.decide(&mut state, |s| s.remove_item(id))?;
        Ok(self.remove_line(state, id).await)
    }

    /// Validates and applies a coupon code against the current subtotal.
    ///
    /// The local decision stands even if the remote service disagrees.
    #[tracing::instrument(skip(self))]
    pub async fn apply_coupon(&self, code: &str) -> Result<CartOutcome> {
        let mut state = self.state.lock().await;
        let action = self.decide(&mut state, |s| s.apply_coupon(&self.catalog, code))?;

        state.apply(action);
        self.persist(&state).await;
        let write = RemoteWrite::ApplyCoupon {
            code: state
                .applied_coupon()
                .map(|coupon| coupon.code.clone())
                .unwrap_or_default(),
            subtotal: state.total_amount(),
        };

        let outcome = CartOutcome::new(format!("Coupon applied! You saved {}", state.discount()));
        self.notifier.success(&outcome.message);
        self.sync_released(state, Some(write)).await;
        Ok(outcome)
    }

    /// Drops the applied coupon and its discount.
    #[tracing::instrument(skip(self))]
    pub async fn remove_coupon(&self) -> Result<CartOutcome> {
        let mut state = self.state.lock().await;
        state.apply(CartAction::CouponRemoved);
        self.persist(&state).await;

        let outcome = CartOutcome::new("Coupon removed");
        self.notifier.success(&outcome.message);
        Ok(outcome)
    }

    /// Empties the cart locally and remotely and discards the snapshot.
    ///
    /// The cart is emptied even when the snapshot cannot be discarded; that
    /// failure is returned after the remote clear has been sent.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self) -> Result<CartOutcome> {
        let mut state = self.state.lock().await;
        state.apply(CartAction::Cleared);
        let discarded = self.discard_snapshot(&state).await;
        self.sync_released(state, Some(RemoteWrite::Clear)).await;

        if let Err(e) = discarded {
            self.notifier.error(&e.to_string());
            return Err(e);
        }
        let outcome = CartOutcome::new("Cart cleared");
        self.notifier.success(&outcome.message);
        Ok(outcome)
    }

    /// Dismisses the "recently added" feedback.
    pub async fn clear_recently_added(&self) {
        self.state
            .lock()
            .await
            .apply(CartAction::RecentlyAddedCleared);
    }

    /// Dismisses the current error.
    pub async fn clear_error(&self) {
        self.state.lock().await.apply(CartAction::ErrorCleared);
    }

    // Queries

    /// Returns subtotal, shipping, discount and grand total.
    pub async fn summary(&self) -> CartSummary {
        self.state.lock().await.summary()
    }

    pub async fn is_item_in_cart(&self, id: &ProductId) -> bool {
        self.state.lock().await.contains(id)
    }

    pub async fn item_quantity(&self, id: &ProductId) -> u32 {
        self.state.lock().await.quantity_of(id)
    }

    pub async fn items(&self) -> Vec<CartItem> {
        self.state.lock().await.items().to_vec()
    }

    pub async fn total_amount(&self) -> Money {
        self.state.lock().await.total_amount()
    }

    /// Returns a copy of the full state.
    pub async fn state(&self) -> CartState {
        self.state.lock().await.clone()
    }

    // Internals

    /// Runs a decision; a rejection is recorded on the state and notified.
    fn decide<F>(&self, state: &mut CartState, decide: F) -> Result<CartAction>
    where
        F: FnOnce(&CartState) -> Result<CartAction>,
    {
        decide(state).inspect_err(|e| {
            tracing::debug!(error = %e, "cart intent rejected");
            state.apply(CartAction::Rejected(e.to_string()));
            self.notifier.error(&e.to_string());
        })
    }

    async fn remove_line(
        &self,
        mut state: MutexGuard<'_, CartState>,
        id: &ProductId,
    ) -> CartOutcome {
        let name = state
            .get_item(id)
            .map(|item| item.name.clone())
            .unwrap_or_else(|| id.to_string());
        state.apply(CartAction::ItemRemoved { id: id.clone() });
        self.persist(&state).await;

        let outcome = CartOutcome::new(format!("{name} removed from cart"));
        self.notifier.success(&outcome.message);
        self.sync_released(state, Some(RemoteWrite::Remove { id: id.clone() }))
            .await;
        outcome
    }

    /// Queues `write` behind the transition held in `state`, releases the
    /// state and sends everything queued so far.
    async fn sync_released(&self, state: MutexGuard<'_, CartState>, write: Option<RemoteWrite>) {
        if let Some(write) = write {
            self.pending.lock().await.push_back(write);
        }
        drop(state);
        self.flush().await;
    }

    /// Sends queued writes in order. Whoever holds the sync turn drains the
    /// queue, so a write queued before this call has been sent on return.
    async fn flush(&self) {
        let _turn = self.sync_turn.lock().await;
        loop {
            let next = self.pending.lock().await.pop_front();
            let Some(write) = next else {
                break;
            };
            self.send(write).await;
        }
    }

    async fn send(&self, write: RemoteWrite) {
        let operation = write.operation();
        let result = match write {
            RemoteWrite::Add { item } => self.remote.add(&item, item.quantity).await,
            RemoteWrite::Update { id, quantity } => self.remote.update(&id, quantity).await,
            RemoteWrite::Remove { id } => self.remote.remove(&id).await,
            RemoteWrite::Clear => self.remote.clear().await,
            RemoteWrite::ApplyCoupon { code, subtotal } => {
                self.remote.apply_coupon(&code, subtotal).await.map(|response| {
                    if !response.success {
                        tracing::warn!(
                            coupon = %code,
                            message = response.message.as_deref().unwrap_or_default(),
                            "remote cart rejected coupon, keeping local decision"
                        );
                    }
                })
            }
        };
        if let Err(e) = result {
            self.record_sync_failure(operation, &e);
        }
    }

    fn record_sync_failure(&self, operation: &'static str, error: &RemoteError) {
        tracing::warn!(operation, error = %error, "remote cart sync failed");
        metrics::counter!("cart_remote_sync_failures_total", "operation" => operation).increment(1);
    }

    async fn persist(&self, state: &CartState) {
        let json = match state.to_snapshot().to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize cart snapshot");
                return;
            }
        };
        if let Err(e) = self.store.set(&self.storage_key, &json).await {
            tracing::warn!(error = %e, "failed to persist cart snapshot");
            metrics::counter!("cart_persist_failures_total").increment(1);
        }
    }

    /// Removes the snapshot, or overwrites it with the empty cart in `state`
    /// when removal fails, so a later load cannot restore old lines.
    async fn discard_snapshot(&self, state: &CartState) -> Result<()> {
        let Err(e) = self.store.remove(&self.storage_key).await else {
            return Ok(());
        };
        tracing::warn!(error = %e, "failed to remove cart snapshot, overwriting it");

        let overwritten = match state.to_snapshot().to_json() {
            Ok(json) => self
                .store
                .set(&self.storage_key, &json)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        overwritten.map_err(|reason| {
            tracing::error!(error = %reason, "stale cart snapshot left in storage");
            metrics::counter!("cart_persist_failures_total").increment(1);
            CartError::SnapshotNotCleared(reason)
        })
    }

    async fn read_snapshot(&self) -> std::result::Result<Option<CartSnapshot>, String> {
        let raw = self
            .store
            .get(&self.storage_key)
            .await
            .map_err(|e| e.to_string())?;
        raw.map(|json| CartSnapshot::from_json(&json))
            .transpose()
            .map_err(|e| format!("corrupt cart snapshot: {e}"))
    }
}
