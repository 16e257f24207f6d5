use std::time::Duration;

use async_trait::async_trait;
use common::OrderId;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::OrderService;
use crate::error::OrderServiceError;
use crate::order::OrderRequest;

/// Per-request timeout of clients created by [`HttpOrderService::new`].
pub const ORDER_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// JSON client for `POST /orders`.
#[derive(Debug, Clone)]
pub struct HttpOrderService {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderResponse {
    success: bool,
    #[serde(default)]
    order_id: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

impl CreateOrderResponse {
    /// The service returns numeric or string IDs.
    fn into_order_id(self) -> Result<OrderId, OrderServiceError> {
        if !self.success {
            return Err(OrderServiceError::Rejected(self.message.unwrap_or_default()));
        }
        match self.order_id {
            Some(serde_json::Value::String(id)) if !id.is_empty() => Ok(OrderId::new(id)),
            Some(serde_json::Value::Number(id)) => Ok(OrderId::new(id.to_string())),
            _ => Err(OrderServiceError::ResponseParseFailed(
                "missing orderId".to_string(),
            )),
        }
    }
}

impl HttpOrderService {
    pub fn new(base_url: impl Into<String>) -> Result<Self, OrderServiceError> {
        let client = Client::builder()
            .timeout(ORDER_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| OrderServiceError::RequestFailed(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl OrderService for HttpOrderService {
    #[tracing::instrument(skip(self, request), fields(transaction_id = %request.payment.transaction_id))]
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderId, OrderServiceError> {
        let response = self
            .client
            .post(format!("{}/orders", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| OrderServiceError::RequestFailed(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json::<CreateOrderResponse>()
                .await
                .map_err(|e| OrderServiceError::ResponseParseFailed(e.to_string()))?
                .into_order_id(),
            StatusCode::SERVICE_UNAVAILABLE => Err(OrderServiceError::Unavailable),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(OrderServiceError::Api {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}
