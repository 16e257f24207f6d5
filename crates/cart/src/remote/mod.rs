//! Remote cart service client.

pub mod http;
pub mod memory;

pub use http::HttpCartRemote;
pub use memory::{InMemoryCartRemote, RemoteCall};

use async_trait::async_trait;
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::coupon::Coupon;
use crate::error::RemoteError;
use crate::item::CartItem;
use crate::snapshot::CartSnapshot;

/// Answer of the cart service to an apply-coupon request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponResponse {
    pub success: bool,
    #[serde(default)]
    pub coupon: Option<Coupon>,
    #[serde(default)]
    pub discount: Option<Money>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Operations offered by the remote cart service.
///
/// Every call may fail independently of local state.
#[async_trait]
pub trait CartRemote: Send + Sync {
    /// Fetches the server-side cart.
    async fn load(&self) -> Result<CartSnapshot, RemoteError>;

    /// Adds a new line.
    async fn add(&self, item: &CartItem, quantity: u32) -> Result<(), RemoteError>;

    /// Sets a line's quantity.
    async fn update(&self, item_id: &ProductId, quantity: u32) -> Result<(), RemoteError>;

    /// Removes a line.
    async fn remove(&self, item_id: &ProductId) -> Result<(), RemoteError>;

    /// Asks the service to validate a coupon against a total.
    async fn apply_coupon(
        &self,
        coupon_code: &str,
        total_amount: Money,
    ) -> Result<CouponResponse, RemoteError>;

    /// Empties the server-side cart.
    async fn clear(&self) -> Result<(), RemoteError>;
}
