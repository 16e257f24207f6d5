//! Local key-value persistence for cart snapshots.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;

use async_trait::async_trait;

use crate::error::StorageError;

/// Key used for the cart snapshot when none is configured.
pub const DEFAULT_CART_KEY: &str = "bharatshaala_cart";

/// A string-keyed store of string values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value under `key`, or None if absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
