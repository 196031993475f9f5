use crate::{
    error::{KanbanError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use std::{collections::BTreeMap, time::Duration};
use tokio::sync::RwLock;

/// In-process storage backed by a sorted map.
///
/// Useful for tests and for running without a disk. An optional latency is
/// awaited before every operation and an optional quota bounds the total
/// size of stored keys and values in bytes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
    latency: Duration,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn used_bytes(entries: &BTreeMap<String, String>) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        true
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.delay().await;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<()> {
        self.delay().await;
        let mut entries = self.entries.write().await;

        if let Some(quota) = self.quota {
            let replaced = entries.get(key).map_or(0, |old| key.len() + old.len());
            let needed = used_bytes(&entries) - replaced + key.len() + value.len();
            if needed > quota {
                return Err(KanbanError::Persistence(format!(
                    "Storage quota exceeded while writing '{}'",
                    key
                )));
            }
        }

        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_raw(&self, key: &str) -> Result<bool> {
        self.delay().await;
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.delay().await;
        let entries = self.entries.read().await;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
