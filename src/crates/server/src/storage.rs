//! The Storage Adapter: an opaque key/value collaborator.
//! Grounded on `langgraph_core::store::{Store, InMemoryStore}` — a trait plus
//! a `DashMap`-backed in-process implementation — adapted here from typed
//! values to opaque `serde_json::Value` so patches and gears can be stored
//! behind the same contract without the engine knowing their shape.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn put(&self, key: &str, value: Value) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    /// Keys sharing `prefix`, e.g. `"gear:"` to list every gear id.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// `DashMap`-backed in-process store. No transactions, no durability across
/// restarts — the concrete collaborator the rest of the crate runs against
/// when no external store is configured.
#[derive(Default)]
pub struct InMemoryStorage {
    entries: DashMap<String, Value>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).map(|v| v.clone()))
    }

    async fn put(&self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self.entries.iter().map(|e| e.key().clone()).filter(|k| k.starts_with(prefix)).collect())
    }
}

pub fn patch_key(id: &str) -> String {
    format!("patch:{id}")
}

pub fn gear_key(id: &str) -> String {
    format!("gear:{id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = InMemoryStorage::new();
        store.put("gear:a", json!({"label": "A"})).await.unwrap();
        assert_eq!(store.get("gear:a").await.unwrap(), Some(json!({"label": "A"})));
    }

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let store = InMemoryStorage::new();
        assert_eq!(store.get("gear:missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let store = InMemoryStorage::new();
        store.put("gear:a", json!(1)).await.unwrap();
        store.delete("gear:a").await.unwrap();
        assert_eq!(store.get("gear:a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_keys_filters_by_prefix() {
        let store = InMemoryStorage::new();
        store.put("gear:a", json!(1)).await.unwrap();
        store.put("patch:p1", json!(1)).await.unwrap();
        let mut keys = store.list_keys("gear:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["gear:a".to_string()]);
    }
}
