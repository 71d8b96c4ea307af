use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::RwLock;
use tracing::debug;

use super::types::{CacheEntry, CacheStats};
use crate::error::AppError;

/// Key-value storage with per-entry expiry.
///
/// Stores only persist and return entries. Deciding what an expired or
/// unreadable entry means is left to [`super::CacheManager`].
pub trait CacheStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<CacheEntry>, AppError>> + Send;

    fn set(&self, entry: CacheEntry) -> impl Future<Output = Result<(), AppError>> + Send;

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Drops every entry and returns how many were removed.
    fn clear(&self) -> impl Future<Output = Result<usize, AppError>> + Send;

    /// Drops entries expired at `now` and returns how many were removed.
    fn clear_expired(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<usize, AppError>> + Send;

    fn stats(&self, now: DateTime<Utc>) -> impl Future<Output = Result<CacheStats, AppError>> + Send;
}

/// In-process store. Lives as long as the pipeline that owns it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, AppError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, entry: CacheEntry) -> Result<(), AppError> {
        self.entries.write().await.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<usize, AppError> {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }

    async fn clear_expired(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();
        debug!("Removed {} expired entries from memory cache", removed);
        Ok(removed)
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<CacheStats, AppError> {
        let entries = self.entries.read().await;
        Ok(CacheStats {
            total_entries: entries.len(),
            expired_entries: entries.values().filter(|e| e.is_expired_at(now)).count(),
        })
    }
}
