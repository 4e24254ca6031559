//! Small TTL cache used to avoid re-fetching rarely changing lists.
//!
//! The TTL policy lives in the store; callers only see whether an entry is
//! still fresh. [`MemoryCache`] suits tests and long-lived processes,
//! [`FileCache`] survives restarts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// TTL used for cached skill lists.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// A cached value and whether it is still within its TTL.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedValue {
    pub value: Value,
    pub is_fresh: bool,
}

/// Key-value store with freshness tracking.
///
/// Async so file-backed stores never block the runtime from inside
/// [`crate::Client::about_skills`].
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the stored value, fresh or stale, or `None` if absent.
    async fn get(&self, key: &str) -> Option<CachedValue>;

    /// Stores `value`, resetting its age.
    async fn set(&self, key: &str, value: Value);
}

/// In-process cache.
///
/// Ages are measured with [`tokio::time::Instant`], so tests running with
/// paused time can advance past the TTL.
#[derive(Debug)]
pub struct MemoryCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, Value)>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<CachedValue> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.get(key).map(|(stored_at, value)| CachedValue {
            value: value.clone(),
            is_fresh: stored_at.elapsed() < self.ttl,
        })
    }

    async fn set(&self, key: &str, value: Value) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), (Instant::now(), value));
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    stored_at: DateTime<Utc>,
    value: Value,
}

/// Cache persisted as a single JSON file.
///
/// File I/O goes through `tokio::fs`. Read and write failures are logged and
/// treated as misses; a broken cache file never fails a request.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    ttl: Duration,
    /// Serializes read-modify-write cycles within this process
    lock: tokio::sync::Mutex<()>,
}

impl FileCache {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            lock: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> HashMap<String, FileEntry> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                warn!("Failed to read cache file {}: {e}", self.path.display());
                return HashMap::new();
            }
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!("Ignoring corrupt cache file {}: {e}", self.path.display());
            HashMap::new()
        })
    }

    fn is_fresh(&self, stored_at: DateTime<Utc>) -> bool {
        // Entries from the future (clock changes) count as stale.
        (Utc::now() - stored_at)
            .to_std()
            .is_ok_and(|age| age < self.ttl)
    }
}

#[async_trait]
impl Cache for FileCache {
    async fn get(&self, key: &str) -> Option<CachedValue> {
        let _guard = self.lock.lock().await;
        self.load().await.remove(key).map(|entry| CachedValue {
            is_fresh: self.is_fresh(entry.stored_at),
            value: entry.value,
        })
    }

    async fn set(&self, key: &str, value: Value) {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await;
        entries.insert(
            key.to_string(),
            FileEntry {
                stored_at: Utc::now(),
                value,
            },
        );

        let result = match serde_json::to_string(&entries) {
            Ok(json) => tokio::fs::write(&self.path, json).await,
            Err(e) => Err(std::io::Error::other(e)),
        };
        if let Err(e) = result {
            warn!("Failed to write cache file {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_memory_cache_expires() {
        let cache = MemoryCache::new(Duration::from_secs(30));
        assert_eq!(cache.get("skills_cache").await, None);

        cache.set("skills_cache", json!({"backend": []})).await;
        let hit = cache.get("skills_cache").await.unwrap();
        assert!(hit.is_fresh);
        assert_eq!(hit.value, json!({"backend": []}));

        tokio::time::advance(Duration::from_secs(31)).await;
        let stale = cache.get("skills_cache").await.unwrap();
        assert!(!stale.is_fresh);
        assert_eq!(stale.value, json!({"backend": []}));
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_cache_set_resets_age() {
        let cache = MemoryCache::default();
        cache.set("k", json!(1)).await;
        tokio::time::advance(Duration::from_secs(40)).await;
        cache.set("k", json!(2)).await;
        let hit = cache.get("k").await.unwrap();
        assert!(hit.is_fresh);
        assert_eq!(hit.value, json!(2));
    }

    #[tokio::test]
    async fn test_file_cache_roundtrip_and_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let cache = FileCache::new(&path, Duration::from_secs(30));
        assert_eq!(cache.get("skills_cache").await, None);
        cache.set("skills_cache", json!({"tools": [{"skillname": "Git"}]})).await;

        let reopened = FileCache::new(&path, Duration::from_secs(30));
        let hit = reopened.get("skills_cache").await.unwrap();
        assert!(hit.is_fresh);
        assert_eq!(hit.value["tools"][0]["skillname"], "Git");

        let zero_ttl = FileCache::new(&path, Duration::ZERO);
        assert!(!zero_ttl.get("skills_cache").await.unwrap().is_fresh);
    }

    #[tokio::test]
    async fn test_file_cache_corrupt_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let cache = FileCache::new(&path, DEFAULT_TTL);
        assert_eq!(cache.get("skills_cache").await, None);

        cache.set("skills_cache", json!([])).await;
        assert!(cache.get("skills_cache").await.unwrap().is_fresh);
    }

    #[tokio::test]
    async fn test_file_cache_unwritable_path_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().join("missing").join("cache.json"), DEFAULT_TTL);
        cache.set("k", json!(1)).await;
        assert_eq!(cache.get("k").await, None);
    }
}
