//! Order service trait and its implementations.

pub mod http;
pub mod memory;

pub use http::HttpOrderService;
pub use memory::InMemoryOrderService;

use async_trait::async_trait;
use common::OrderId;

use crate::error::OrderServiceError;
use crate::order::OrderRequest;

/// Creates orders once payment has gone through.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Submits a paid order and returns the ID the service assigned.
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderId, OrderServiceError>;
}
