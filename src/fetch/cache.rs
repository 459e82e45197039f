//! Bounded snapshot cache with LRU eviction and a time-to-live.

use crate::domain::RepoSnapshot;
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Number of leading token characters folded into the cache key.
const TOKEN_PREFIX_CHARS: usize = 10;

/// Cache key for a source URL and optional credential. Only a digest of the
/// credential prefix is kept, never the credential itself.
pub fn cache_key(url: &str, token: Option<&str>) -> String {
    match token {
        Some(token) => {
            let prefix: String = token.chars().take(TOKEN_PREFIX_CHARS).collect();
            let digest = format!("{:x}", Sha256::digest(prefix.as_bytes()));
            format!("{url}#{}", &digest[..16])
        }
        None => url.to_string(),
    }
}

struct Entry {
    snapshot: Arc<RepoSnapshot>,
    inserted_at: Instant,
}

/// Thread-safe cache shared by concurrent requests. The lock is never held
/// across an await point; concurrent misses for one key both fetch and the
/// last insert wins.
pub struct SnapshotCache {
    ttl: Duration,
    inner: Mutex<LruCache<String, Entry>>,
}

impl SnapshotCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { ttl, inner: Mutex::new(LruCache::new(capacity)) }
    }

    pub fn get(&self, key: &str) -> Option<Arc<RepoSnapshot>> {
        let mut entries = self.lock();
        match entries.get(key) {
            None => return None,
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => return Some(Arc::clone(&entry.snapshot)),
            Some(_) => {}
        }

        tracing::debug!("snapshot cache entry expired");
        entries.pop(key);
        None
    }

    pub fn insert(&self, key: String, snapshot: Arc<RepoSnapshot>) {
        let evicted = self.lock().push(key.clone(), Entry { snapshot, inserted_at: Instant::now() });
        if evicted.is_some_and(|(old, _)| old != key) {
            tracing::debug!("evicted least recently used snapshot");
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Entry>> {
        // A panic while holding the lock leaves plain data behind; keep using it.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
