use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{Money, ProductId};
use tokio::sync::RwLock;

use super::{CartRemote, CouponResponse};
use crate::coupon::CouponCatalog;
use crate::error::RemoteError;
use crate::item::CartItem;
use crate::snapshot::CartSnapshot;

/// A request received by [`InMemoryCartRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Load,
    Add { item_id: ProductId, quantity: u32 },
    Update { item_id: ProductId, quantity: u32 },
    Remove { item_id: ProductId },
    ApplyCoupon { code: String, total_amount: Money },
    Clear,
}

#[derive(Debug, Default)]
struct InMemoryCartState {
    items: Vec<CartItem>,
    shipping_cost: Money,
    calls: Vec<RemoteCall>,
}

/// In-memory cart service for testing and offline runs.
///
/// Keeps its own copy of the cart so tests can observe what was synced.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartRemote {
    state: Arc<RwLock<InMemoryCartState>>,
    offline: Arc<AtomicBool>,
    catalog: CouponCatalog,
}

impl InMemoryCartRemote {
    /// Creates an empty, reachable service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service that fails every call.
    pub fn offline() -> Self {
        let remote = Self::default();
        remote.set_offline(true);
        remote
    }

    /// Toggles whether every call fails with [`RemoteError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Replaces the server-side cart contents.
    pub async fn seed(&self, items: Vec<CartItem>, shipping_cost: Money) {
        let mut state = self.state.write().await;
        state.items = items;
        state.shipping_cost = shipping_cost;
    }

    /// Returns the server-side lines.
    pub async fn items(&self) -> Vec<CartItem> {
        self.state.read().await.items.clone()
    }

    /// Returns every request received so far, including failed ones.
    pub async fn calls(&self) -> Vec<RemoteCall> {
        self.state.read().await.calls.clone()
    }

    async fn record(&self, call: RemoteCall) -> Result<(), RemoteError> {
        self.state.write().await.calls.push(call);
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl CartRemote for InMemoryCartRemote {
    async fn load(&self) -> Result<CartSnapshot, RemoteError> {
        self.record(RemoteCall::Load).await?;
        let state = self.state.read().await;
        Ok(CartSnapshot {
            items: state.items.clone(),
            total_items: state.items.iter().map(|i| i.quantity).sum(),
            total_amount: state.items.iter().map(CartItem::line_total).sum(),
            applied_coupon: None,
            discount: Money::zero(),
            shipping_cost: Some(state.shipping_cost),
        })
    }

    async fn add(&self, item: &CartItem, quantity: u32) -> Result<(), RemoteError> {
        self.record(RemoteCall::Add {
            item_id: item.id.clone(),
            quantity,
        })
        .await?;
        let mut state = self.state.write().await;
        match state.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => existing.quantity += quantity,
            None => {
                let mut line = item.clone();
                line.quantity = quantity;
                state.items.push(line);
            }
        }
        Ok(())
    }

    async fn update(&self, item_id: &ProductId, quantity: u32) -> Result<(), RemoteError> {
        self.record(RemoteCall::Update {
            item_id: item_id.clone(),
            quantity,
        })
        .await?;
        let mut state = self.state.write().await;
        if let Some(existing) = state.items.iter_mut().find(|i| &i.id == item_id) {
            existing.quantity = quantity;
        }
        Ok(())
    }

    async fn remove(&self, item_id: &ProductId) -> Result<(), RemoteError> {
        self.record(RemoteCall::Remove {
            item_id: item_id.clone(),
        })
        .await?;
        self.state.write().await.items.retain(|i| &i.id != item_id);
        Ok(())
    }

    async fn apply_coupon(
        &self,
        coupon_code: &str,
        total_amount: Money,
    ) -> Result<CouponResponse, RemoteError> {
        self.record(RemoteCall::ApplyCoupon {
            code: coupon_code.to_string(),
            total_amount,
        })
        .await?;
        Ok(match self.catalog.validate(coupon_code, total_amount) {
            Ok((coupon, discount)) => CouponResponse {
                success: true,
                coupon: Some(coupon),
                discount: Some(discount),
                message: None,
            },
            Err(e) => CouponResponse {
                success: false,
                coupon: None,
                discount: None,
                message: Some(e.to_string()),
            },
        })
    }

    async fn clear(&self) -> Result<(), RemoteError> {
        self.record(RemoteCall::Clear).await?;
        self.state.write().await.items.clear();
        Ok(())
    }
}
