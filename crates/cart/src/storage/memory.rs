use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::KeyValueStore;
use crate::error::StorageError;

/// In-memory key-value store for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    values: Arc<RwLock<HashMap<String, String>>>,
    fail_on_read: Arc<AtomicBool>,
    fail_on_write: Arc<AtomicBool>,
    fail_on_remove: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `get` fail.
    pub fn set_fail_on_read(&self, fail: bool) {
        self.fail_on_read.store(fail, Ordering::SeqCst);
    }

    /// Makes every `set` and `remove` fail.
    pub fn set_fail_on_write(&self, fail: bool) {
        self.fail_on_write.store(fail, Ordering::SeqCst);
    }

    /// Makes only `remove` fail, leaving `set` working.
    pub fn set_fail_on_remove(&self, fail: bool) {
        self.fail_on_remove.store(fail, Ordering::SeqCst);
    }

    /// Returns the raw value under `key`, bypassing failure switches.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }

    /// Writes a raw value, bypassing failure switches.
    pub async fn put_raw(&self, key: &str, value: impl Into<String>) {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.into());
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_on_read.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("read disabled".to_string()));
        }
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_on_write.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("write disabled".to_string()));
        }
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_on_write.load(Ordering::SeqCst) || self.fail_on_remove.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("write disabled".to_string()));
        }
        self.values.write().await.remove(key);
        Ok(())
    }
}
