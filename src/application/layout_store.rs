// Layout store trait - Key-value sink for serialized dashboards
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
    #[error("storage I/O failed for '{key}'")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize layout")]
    Serialize(#[from] serde_json::Error),
}

/// Stores whole serialized layouts. Saves replace; there is no partial update.
#[async_trait]
pub trait LayoutStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Returns whether something was removed
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Keys starting with `prefix`, sorted
    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}
