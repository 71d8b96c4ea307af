//! Cache data structures with TTL support

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

/// One stored value with an absolute expiry.
///
/// Wall-clock timestamps are used so entries written by one process stay
/// meaningful to the next one reading the same store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates an entry expiring `ttl` after `now`.
    pub fn new(
        key: impl Into<String>,
        value: serde_json::Value,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let delta = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        let expires_at = now
            .checked_add_signed(delta)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            key: key.into(),
            value,
            created_at: now,
            expires_at,
        }
    }

    /// An entry is expired from `expires_at` onwards.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let expired = now >= self.expires_at;
        trace!(
            "Cache expiration check: key={}, expires_at={}, is_expired={}",
            self.key, self.expires_at, expired
        );
        expired
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Remaining lifetime, zero once expired.
    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Snapshot of a store's contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
}

impl CacheStats {
    pub fn live_entries(&self) -> usize {
        self.total_entries.saturating_sub(self.expired_entries)
    }
}
