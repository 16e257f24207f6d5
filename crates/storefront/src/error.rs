use cart::{CartError, RemoteError, StorageError};
use checkout::{CheckoutError, OrderServiceError};
use thiserror::Error;

/// Errors surfaced by the storefront application.
#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The cart service client could not be built.
    #[error("Cart service client: {0}")]
    CartService(#[from] RemoteError),

    /// The order service client could not be built.
    #[error("Order service client: {0}")]
    OrderService(#[from] OrderServiceError),

    #[error("Metrics recorder: {0}")]
    Metrics(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Storage directory {path} is not usable: {source}")]
    StorageDir {
        path: String,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
