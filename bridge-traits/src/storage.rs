//! Key-Value Persistence Abstractions
//!
//! Provides the platform-agnostic trait the core uses to persist favorites,
//! recent history, and settings. Values are opaque strings; the core stores
//! structured JSON text under one namespaced key per collection.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::{BridgeError, Result};

/// Key-value persistence trait
///
/// Abstracts platform-specific preferences/document storage:
/// - iOS: UserDefaults / AsyncStorage
/// - Android: SharedPreferences / DataStore
/// - Desktop: SQLite table
/// - Web: localStorage / IndexedDB
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::KeyValueStore;
///
/// async fn save_theme(store: &dyn KeyValueStore) -> Result<()> {
///     store.set("@app_settings", r#"{"theme":"dark"}"#).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieve the value stored under `key`, or `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// List every key currently stored.
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Remove several keys at once.
    ///
    /// The default implementation removes them one by one and stops at the
    /// first failure.
    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}

/// Process-local key-value store for testing and development.
///
/// Keys are kept sorted so `list_keys` is deterministic.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> BridgeError {
        BridgeError::Storage("memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| Self::poisoned())?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned())?;
        entries.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let entries = self.entries.lock().map_err(|_| Self::poisoned())?;
        Ok(entries.keys().cloned().collect())
    }
}
