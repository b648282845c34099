//! Keyed result cache
//!
//! JSON files under a cache directory, one per `(region, window)` pair.
//! Entries carry their write time and expire after a configurable TTL;
//! a stale, absent, or unreadable entry reads as a miss. Expiry on read
//! replaces the original design's never-expiring file-presence check.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Default entry lifetime.
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// Cache address: one entry per region+window pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub region: String,
    pub window: String,
}

impl CacheKey {
    pub fn new(region: impl Into<String>, window: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            window: window.into(),
        }
    }

    fn file_name(&self) -> String {
        format!("cache_{}_{}.json", self.region, self.window)
    }
}

/// Envelope written to disk around every payload.
#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    written_at: DateTime<Utc>,
    payload: T,
}

/// File-backed cache with TTL-on-read staleness.
pub struct FsCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FsCache {
    /// Open (creating if needed) a cache directory.
    pub fn new<P: AsRef<Path>>(dir: P, ttl: Duration) -> CacheResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, ttl })
    }

    /// Fresh payload for `key`, or `None` on miss, stale entry, or an
    /// entry this build cannot read (treated as a miss, not an error).
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let path = self.dir.join(key.file_name());
        let raw = fs::read_to_string(&path).ok()?;

        let envelope: Envelope<T> = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "discarding unreadable cache entry");
                return None;
            }
        };

        let age = Utc::now() - envelope.written_at;
        if age > self.ttl {
            debug!(file = %path.display(), age_secs = age.num_seconds(), "cache entry stale");
            return None;
        }

        debug!(file = %path.display(), "cache hit");
        Some(envelope.payload)
    }

    /// Write `payload` for `key`, stamping the current time.
    pub fn put<T: Serialize>(&self, key: &CacheKey, payload: &T) -> CacheResult<()> {
        let envelope = Envelope {
            written_at: Utc::now(),
            payload,
        };
        let path = self.dir.join(key.file_name());
        fs::write(&path, serde_json::to_string(&envelope)?)?;
        debug!(file = %path.display(), "cache entry written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(dir: &Path, ttl_secs: i64) -> FsCache {
        FsCache::new(dir, Duration::seconds(ttl_secs)).unwrap()
    }

    #[test]
    fn test_put_then_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), 60);
        let key = CacheKey::new("KH", "30d");

        cache.put(&key, &vec![1.0, 2.0, 3.0]).unwrap();
        let loaded: Vec<f64> = cache.get(&key).unwrap();
        assert_eq!(loaded, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_absent_key_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), 60);

        let loaded: Option<Vec<f64>> = cache.get(&CacheKey::new("KH", "30d"));
        assert!(loaded.is_none());
    }

    #[test]
    fn test_expired_entry_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), -1); // everything is already stale
        let key = CacheKey::new("KH", "1d");

        cache.put(&key, &vec![9.0]).unwrap();
        let loaded: Option<Vec<f64>> = cache.get(&key);
        assert!(loaded.is_none());
    }

    #[test]
    fn test_corrupt_entry_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), 60);
        let key = CacheKey::new("KH", "ranking");

        fs::write(dir.path().join(key.file_name()), "{not json").unwrap();
        let loaded: Option<Vec<f64>> = cache.get(&key);
        assert!(loaded.is_none());
    }

    #[test]
    fn test_distinct_windows_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(dir.path(), 60);

        cache.put(&CacheKey::new("KH", "1d"), &vec![1.0]).unwrap();
        cache.put(&CacheKey::new("KH", "30d"), &vec![2.0]).unwrap();

        let one: Vec<f64> = cache.get(&CacheKey::new("KH", "1d")).unwrap();
        let thirty: Vec<f64> = cache.get(&CacheKey::new("KH", "30d")).unwrap();
        assert_eq!((one[0], thirty[0]), (1.0, 2.0));
    }
}
