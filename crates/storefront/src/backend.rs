//! Runtime choice between HTTP and in-memory collaborators.

use async_trait::async_trait;
use cart::{
    CartItem, CartRemote, CartSnapshot, CouponResponse, HttpCartRemote, InMemoryCartRemote,
    RemoteError,
};
use checkout::{HttpOrderService, InMemoryOrderService, OrderRequest, OrderService, OrderServiceError};
use common::{Money, OrderId, ProductId};

/// Cart service used by the storefront.
#[derive(Debug, Clone)]
pub enum CartBackend {
    Http(HttpCartRemote),
    /// No cart service configured; every remote call fails and the local
    /// snapshot is authoritative.
    Offline(InMemoryCartRemote),
}

impl CartBackend {
    pub fn from_url(url: Option<&str>) -> Result<Self, RemoteError> {
        Ok(match url {
            Some(url) => CartBackend::Http(HttpCartRemote::new(url)?),
            None => CartBackend::Offline(InMemoryCartRemote::offline()),
        })
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, CartBackend::Offline(_))
    }
}

#[async_trait]
impl CartRemote for CartBackend {
    async fn load(&self) -> Result<CartSnapshot, RemoteError> {
        match self {
            CartBackend::Http(r) => r.load().await,
            CartBackend::Offline(r) => r.load().await,
        }
    }

    async fn add(&self, item: &CartItem, quantity: u32) -> Result<(), RemoteError> {
        match self {
            CartBackend::Http(r) => r.add(item, quantity).await,
            CartBackend::Offline(r) => r.add(item, quantity).await,
        }
    }

    async fn update(&self, item_id: &ProductId, quantity: u32) -> Result<(), RemoteError> {
        match self {
            CartBackend::Http(r) => r.update(item_id, quantity).await,
            CartBackend::Offline(r) => r.update(item_id, quantity).await,
        }
    }

    async fn remove(&self, item_id: &ProductId) -> Result<(), RemoteError> {
        match self {
            CartBackend::Http(r) => r.remove(item_id).await,
            CartBackend::Offline(r) => r.remove(item_id).await,
        }
    }

    async fn apply_coupon(
        &self,
        coupon_code: &str,
        total_amount: Money,
    ) -> Result<CouponResponse, RemoteError> {
        match self {
            CartBackend::Http(r) => r.apply_coupon(coupon_code, total_amount).await,
            CartBackend::Offline(r) => r.apply_coupon(coupon_code, total_amount).await,
        }
    }

    async fn clear(&self) -> Result<(), RemoteError> {
        match self {
            CartBackend::Http(r) => r.clear().await,
            CartBackend::Offline(r) => r.clear().await,
        }
    }
}

/// Order service used by the storefront.
#[derive(Debug, Clone)]
pub enum OrderBackend {
    Http(HttpOrderService),
    InMemory(InMemoryOrderService),
}

impl OrderBackend {
    pub fn from_url(url: Option<&str>) -> Result<Self, OrderServiceError> {
        Ok(match url {
            Some(url) => OrderBackend::Http(HttpOrderService::new(url)?),
            None => OrderBackend::InMemory(InMemoryOrderService::new()),
        })
    }
}

#[async_trait]
impl OrderService for OrderBackend {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderId, OrderServiceError> {
        match self {
            OrderBackend::Http(s) => s.create_order(request).await,
            OrderBackend::InMemory(s) => s.create_order(request).await,
        }
    }
}
