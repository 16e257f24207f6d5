use std::time::Duration;

use async_trait::async_trait;
use common::{Money, ProductId};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use super::{CartRemote, CouponResponse};
use crate::error::RemoteError;
use crate::item::CartItem;
use crate::snapshot::CartSnapshot;

/// Per-request timeout of clients created by [`HttpCartRemote::new`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON client for the remote cart service.
#[derive(Debug, Clone)]
pub struct HttpCartRemote {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Ack {
    #[serde(default = "ack_default_success")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

fn ack_default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct LoadResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    cart: CartSnapshot,
}

#[derive(Debug, Serialize)]
struct AddRequest<'a> {
    item: &'a CartItem,
    quantity: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    item_id: &'a ProductId,
    quantity: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplyCouponRequest<'a> {
    coupon_code: &'a str,
    total_amount: Money,
}

impl HttpCartRemote {
    /// Creates a client for the service at `base_url` (no trailing slash needed).
    ///
    /// Requests give up after [`REQUEST_TIMEOUT`].
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RemoteError::RequestFailed(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, RemoteError> {
        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::RequestFailed(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json::<T>()
                .await
                .map_err(|e| RemoteError::ResponseParseFailed(e.to_string())),
            StatusCode::SERVICE_UNAVAILABLE => Err(RemoteError::Unavailable),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(RemoteError::Api {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }

    async fn send_ack(request: RequestBuilder) -> Result<(), RemoteError> {
        let ack: Ack = Self::send_json(request).await?;
        if ack.success {
            Ok(())
        } else {
            Err(RemoteError::Rejected(ack.message.unwrap_or_default()))
        }
    }
}

#[async_trait]
impl CartRemote for HttpCartRemote {
    async fn load(&self) -> Result<CartSnapshot, RemoteError> {
        let response: LoadResponse = Self::send_json(self.client.get(self.url("/cart"))).await?;
        if !response.success {
            return Err(RemoteError::Rejected(response.message.unwrap_or_default()));
        }
        Ok(response.cart)
    }

    async fn add(&self, item: &CartItem, quantity: u32) -> Result<(), RemoteError> {
        let body = AddRequest { item, quantity };
        Self::send_ack(self.client.post(self.url("/cart/add")).json(&body)).await
    }

    async fn update(&self, item_id: &ProductId, quantity: u32) -> Result<(), RemoteError> {
        let body = UpdateRequest { item_id, quantity };
        Self::send_ack(self.client.put(self.url("/cart/update")).json(&body)).await
    }

    async fn remove(&self, item_id: &ProductId) -> Result<(), RemoteError> {
        let url = self.url(&format!("/cart/remove/{item_id}"));
        Self::send_ack(self.client.delete(url)).await
    }

    async fn apply_coupon(
        &self,
        coupon_code: &str,
        total_amount: Money,
    ) -> Result<CouponResponse, RemoteError> {
        let body = ApplyCouponRequest {
            coupon_code,
            total_amount,
        };
        Self::send_json(self.client.post(self.url("/cart/apply-coupon")).json(&body)).await
    }

    async fn clear(&self) -> Result<(), RemoteError> {
        Self::send_ack(self.client.delete(self.url("/cart/clear"))).await
    }
}
