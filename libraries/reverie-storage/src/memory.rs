//! In-memory key-value store (tests, ephemeral sessions)

use async_trait::async_trait;
use reverie_core::KeyValueStore;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Key-value store backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing has been stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn load(&self, key: &str) -> reverie_core::Result<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &[u8]) -> reverie_core::Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.load("missing").await.unwrap(), None);

        store.save("k", b"v1").await.unwrap();
        store.save("k", b"v2").await.unwrap();

        assert_eq!(store.load("k").await.unwrap(), Some(b"v2".to_vec()));
        assert_eq!(store.len().await, 1);
    }
}
