use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::store::CacheStore;
use super::types::{CacheEntry, CacheStats};
use crate::error::AppError;

/// Typed, TTL-bounded access to a [`CacheStore`].
///
/// Reads and writes never fail from the caller's point of view. A store fault,
/// an expired entry and an entry that no longer deserializes are all plain
/// misses, logged at `warn!` or `debug!`.
#[derive(Debug)]
pub struct CacheManager<S> {
    store: S,
    ttl: Duration,
}

impl<S: CacheStore> CacheManager<S> {
    pub fn new(store: S, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the cached value for `key`, or `None` on any kind of miss.
    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = match self.store.get(key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!("Cache miss: key={}", key);
                return None;
            }
            Err(e) => {
                warn!("Cache read failed, treating as miss: key={}, error={}", key, e);
                return None;
            }
        };

        if entry.is_expired_at(Utc::now()) {
            debug!("Cache entry expired: key={}, expires_at={}", key, entry.expires_at);
            if let Err(e) = self.store.remove(key).await {
                warn!("Failed to remove expired cache entry {}: {}", key, e);
            }
            return None;
        }

        match serde_json::from_value(entry.value) {
            Ok(value) => {
                debug!("Cache hit: key={}", key);
                Some(value)
            }
            Err(e) => {
                warn!("Cached value for {} no longer deserializes, treating as miss: {}", key, e);
                None
            }
        }
    }

    /// Stores `value` with the manager's TTL. Returns whether it was written.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        self.set_with_ttl(key, value, self.ttl).await
    }

    #[instrument(skip(self, key, value), fields(key = %key))]
    pub async fn set_with_ttl<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> bool {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize cache value for {}: {}", key, e);
                return false;
            }
        };

        let entry = CacheEntry::new(key, value, ttl, Utc::now());
        match self.store.set(entry).await {
            Ok(()) => {
                debug!("Cached value: key={}, ttl={:?}", key, ttl);
                true
            }
            Err(e) => {
                warn!("Cache write failed for {}: {}", key, e);
                false
            }
        }
    }

    /// Drops every entry.
    pub async fn clear(&self) -> Result<usize, AppError> {
        let removed = self.store.clear().await?;
        info!("Cleared {} cache entries", removed);
        Ok(removed)
    }

    /// Drops only the entries that have expired.
    pub async fn clear_expired(&self) -> Result<usize, AppError> {
        let removed = self.store.clear_expired(Utc::now()).await?;
        info!("Cleared {} expired cache entries", removed);
        Ok(removed)
    }

    pub async fn stats(&self) -> Result<CacheStats, AppError> {
        self.store.stats(Utc::now()).await
    }
}
