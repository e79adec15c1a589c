//! In-memory blob store backed by a `HashMap` behind a `Mutex`.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use subwatch_types::{BlobStore, traits::Result};

/// An in-memory [`BlobStore`] implementation for testing and ephemeral use.
pub struct InMemoryBlobStore {
    /// Key-indexed documents.
    data: Mutex<HashMap<String, Value>>,
}

impl InMemoryBlobStore {
    /// Creates a new empty in-memory blob store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self
            .data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryBlobStore::new();
        store.set("tokens", &json!({"a": 1})).await.unwrap();
        assert_eq!(store.get("tokens").await.unwrap(), Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = InMemoryBlobStore::new();
        assert!(store.get("tokens").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite() {
        let store = InMemoryBlobStore::new();
        store.set("tokens", &json!("first")).await.unwrap();
        store.set("tokens", &json!("second")).await.unwrap();
        assert_eq!(store.get("tokens").await.unwrap(), Some(json!("second")));
    }
}
