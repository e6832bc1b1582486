// Layout persistence - Named dashboards over a layout store
use crate::application::layout_store::{LayoutStore, StoreError};
use crate::domain::dashboard::DashboardLayout;
use crate::infrastructure::layout_codec;
use std::sync::Arc;

/// Namespace every dashboard key lives under
pub const KEY_PREFIX: &str = "canvas-dashboard:";

#[derive(Clone)]
pub struct LayoutPersistence {
    store: Arc<dyn LayoutStore>,
}

impl LayoutPersistence {
    pub fn new(store: Arc<dyn LayoutStore>) -> Self {
        Self { store }
    }

    pub fn key_for(dashboard_id: &str) -> String {
        format!("{}{}", KEY_PREFIX, dashboard_id)
    }

    /// Missing, unreadable or outdated layouts all come back empty
    pub async fn load(&self, dashboard_id: &str) -> Result<DashboardLayout, StoreError> {
        match self.store.load(&Self::key_for(dashboard_id)).await? {
            Some(json) => Ok(layout_codec::decode(&json, dashboard_id)),
            None => {
                tracing::debug!("No stored layout for {}", dashboard_id);
                Ok(DashboardLayout::empty(dashboard_id))
            }
        }
    }

    /// Replace the stored layout wholesale
    pub async fn save(&self, dashboard_id: &str, layout: &DashboardLayout) -> Result<(), StoreError> {
        let json = layout_codec::encode(layout)?;
        self.store.save(&Self::key_for(dashboard_id), &json).await
    }

    pub async fn delete(&self, dashboard_id: &str) -> Result<bool, StoreError> {
        self.store.delete(&Self::key_for(dashboard_id)).await
    }

    /// Ids of every stored dashboard
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        let keys = self.store.keys(KEY_PREFIX).await?;
        Ok(keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(KEY_PREFIX).map(str::to_string))
            .collect())
    }
}
