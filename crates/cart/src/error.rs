//! Cart error types.

use common::{Money, ProductId};
use thiserror::Error;

/// Errors returned by cart commands.
///
/// Local validation, unrecoverable load failures and a snapshot that
/// survives a clear surface here. Remote sync failures are logged and never
/// returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    /// Item is not in the cart.
    #[error("Item not found in cart: {product_id}")]
    ItemNotFound { product_id: ProductId },

    /// Listing carries a price below zero.
    #[error("Invalid price for {product_id}: {price}")]
    InvalidPrice { product_id: ProductId, price: Money },

    /// Requested quantity is not usable.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Coupon code is not in the catalog.
    #[error("Unknown coupon code: {code}")]
    UnknownCoupon { code: String },

    /// Cart subtotal is below the coupon's minimum order amount.
    #[error("Coupon {code} requires a minimum order of {min_order}, cart subtotal is {subtotal}")]
    CouponMinimumNotMet {
        code: String,
        min_order: Money,
        subtotal: Money,
    },

    /// Neither the remote cart nor the local snapshot could be loaded.
    #[error("Failed to load cart: {0}")]
    Load(String),

    /// The cart was emptied but its old snapshot is still in storage.
    #[error("Cart cleared but the saved cart could not be discarded: {0}")]
    SnapshotNotCleared(String),
}

/// Errors from the remote cart service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request could not be sent or the connection failed.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The service answered with a non-success status.
    #[error("Cart service error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered `success: false`.
    #[error("Cart service rejected the request: {0}")]
    Rejected(String),

    /// The response body could not be parsed.
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// The service is unreachable.
    #[error("Cart service unavailable")]
    Unavailable,
}

/// Errors from the local key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored value could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store is not available.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for cart results.
pub type Result<T> = std::result::Result<T, CartError>;
