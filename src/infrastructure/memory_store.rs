// In-memory layout store
use crate::application::layout_store::{LayoutStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryLayoutStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LayoutStore for MemoryLayoutStore {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_load_delete() {
        let store = MemoryLayoutStore::new();
        assert_eq!(store.load("a").await.unwrap(), None);

        store.save("p:b", "2").await.unwrap();
        store.save("p:a", "1").await.unwrap();
        store.save("q:c", "3").await.unwrap();
        store.save("p:a", "1b").await.unwrap();

        assert_eq!(store.load("p:a").await.unwrap().as_deref(), Some("1b"));
        assert_eq!(store.keys("p:").await.unwrap(), vec!["p:a".to_string(), "p:b".to_string()]);
        assert!(store.delete("p:a").await.unwrap());
        assert!(!store.delete("p:a").await.unwrap());
    }
}
