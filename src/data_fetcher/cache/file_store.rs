use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use super::store::CacheStore;
use super::types::{CacheEntry, CacheStats};
use crate::error::AppError;

const ENTRY_EXTENSION: &str = "json";

/// Disk-backed store, one JSON file per key.
///
/// Writes go through a temporary file and a rename so a reader in another
/// process sees either the old entry or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{ENTRY_EXTENSION}", encode_file_name(key)))
    }

    async fn entry_files(&self) -> Result<Vec<PathBuf>, AppError> {
        let mut files = Vec::new();
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e.into()),
        };

        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION) {
                files.push(path);
            }
        }
        Ok(files)
    }

    async fn read_entry(path: &Path) -> Result<Option<CacheEntry>, AppError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_file(path: &Path) -> Result<(), AppError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Maps a key to a file name: ASCII alphanumerics, `-` and `_` stay, every
/// other byte becomes `%XX`. Distinct keys get distinct names.
fn encode_file_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            name.push(byte as char);
        } else {
            let _ = write!(name, "%{byte:02X}");
        }
    }
    name
}

impl CacheStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, AppError> {
        Self::read_entry(&self.entry_path(key)).await
    }

    async fn set(&self, entry: CacheEntry) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.entry_path(&entry.key);
        let tmp = path.with_extension(format!("{ENTRY_EXTENSION}.{}.tmp", std::process::id()));
        let bytes = serde_json::to_vec(&entry)?;

        fs::write(&tmp, bytes).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!("Wrote cache entry {} to {}", entry.key, path.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        Self::remove_file(&self.entry_path(key)).await
    }

    async fn clear(&self) -> Result<usize, AppError> {
        let mut removed = 0;
        for path in self.entry_files().await? {
            Self::remove_file(&path).await?;
            removed += 1;
        }
        Ok(removed)
    }

    async fn clear_expired(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let mut removed = 0;
        for path in self.entry_files().await? {
            let stale = match Self::read_entry(&path).await {
                Ok(Some(entry)) => entry.is_expired_at(now),
                Ok(None) => false,
                Err(e) => {
                    warn!("Removing unreadable cache file {}: {}", path.display(), e);
                    true
                }
            };
            if stale {
                Self::remove_file(&path).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<CacheStats, AppError> {
        let mut stats = CacheStats::default();
        for path in self.entry_files().await? {
            stats.total_entries += 1;
            // Unreadable files count as expired, clear_expired removes them
            match Self::read_entry(&path).await {
                Ok(Some(entry)) if !entry.is_expired_at(now) => {}
                _ => stats.expired_entries += 1,
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_encode_file_name_is_safe_and_distinct() {
        assert_eq!(encode_file_name("matches:tournament_id=1"), "matches%3Atournament_id%3D1");
        assert_ne!(encode_file_name("a/b"), encode_file_name("a%2Fb"));
        assert!(!encode_file_name("../../etc").contains('/'));
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("cache"));
        let now = Utc::now();

        assert!(store.get("missing").await.unwrap().is_none());

        let entry = CacheEntry::new("k:x=1", json!({"a": 1}), Duration::from_secs(60), now);
        store.set(entry.clone()).await.unwrap();

        let back = store.get("k:x=1").await.unwrap().unwrap();
        assert_eq!(back, entry);
        assert!(store.entry_path("k:x=1").exists());

        store.remove("k:x=1").await.unwrap();
        assert!(store.get("k:x=1").await.unwrap().is_none());
        // Removing twice is fine
        store.remove("k:x=1").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_is_error_then_cleared() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::write(store.entry_path("bad"), b"{not json").unwrap();

        assert!(store.get("bad").await.is_err());

        let stats = store.stats(Utc::now()).await.unwrap();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.expired_entries, 1);

        assert_eq!(store.clear_expired(Utc::now()).await.unwrap(), 1);
        assert!(!store.entry_path("bad").exists());
    }

    #[tokio::test]
    async fn test_file_store_clear_and_clear_expired() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let now = Utc::now();

        for (key, secs) in [("a", 1), ("b", 1), ("c", 3600)] {
            store
                .set(CacheEntry::new(key, json!(key), Duration::from_secs(secs), now))
                .await
                .unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), b"not a cache file").unwrap();

        let later = now + TimeDelta::seconds(5);
        assert_eq!(store.clear_expired(later).await.unwrap(), 2);
        assert!(store.get("c").await.unwrap().is_some());

        assert_eq!(store.clear().await.unwrap(), 1);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_file_store_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("never-created"));
        assert_eq!(store.clear().await.unwrap(), 0);
        assert_eq!(store.stats(Utc::now()).await.unwrap(), CacheStats::default());
    }
}
