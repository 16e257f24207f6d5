use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use tokio::sync::RwLock;

use super::OrderService;
use crate::error::OrderServiceError;
use crate::order::OrderRequest;

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: Vec<(OrderId, OrderRequest)>,
    next_id: u32,
    fail_on_create: bool,
}

/// In-memory order service for testing and offline runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderService {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail every create call.
    pub async fn set_fail_on_create(&self, fail: bool) {
        self.state.write().await.fail_on_create = fail;
    }

    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the stored request for an order ID.
    pub async fn get(&self, order_id: &OrderId) -> Option<OrderRequest> {
        self.state
            .read()
            .await
            .orders
            .iter()
            .find(|(id, _)| id == order_id)
            .map(|(_, request)| request.clone())
    }
}

#[async_trait]
impl OrderService for InMemoryOrderService {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderId, OrderServiceError> {
        let mut state = self.state.write().await;

        if state.fail_on_create {
            return Err(OrderServiceError::Unavailable);
        }

        state.next_id += 1;
        let order_id = OrderId::new(format!("ORD-{:04}", state.next_id));
        state.orders.push((order_id.clone(), request.clone()));

        Ok(order_id)
    }
}
