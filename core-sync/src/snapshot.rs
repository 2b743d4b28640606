//! Per-credential snapshot cache
//!
//! Holds the last materialized entry list for each credential so repeat
//! requests don't re-enumerate the remote tree. Keys are derived, never the
//! raw credential: whatever inspects the cache only ever sees a digest.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use core_mirror::Entry;
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use tokio::sync::Mutex;
use tracing::debug;

const CACHE_KEY_PREFIX: &str = "entries:";

/// Snapshots retained before the least recently used credential is evicted
const DEFAULT_CAPACITY: usize = 64;

/// In-memory LRU cache of entry snapshots, one slot per credential
pub struct SnapshotCache {
    inner: Mutex<LruCache<String, Vec<Entry>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY).expect("non-zero default"));
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cache key for a credential: fixed prefix plus a non-reversible digest
    fn cache_key(credential: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(credential.as_bytes());
        format!(
            "{}{}",
            CACHE_KEY_PREFIX,
            URL_SAFE_NO_PAD.encode(hasher.finalize())
        )
    }

    /// Last snapshot stored for this credential, if any
    pub async fn get(&self, credential: &str) -> Option<Vec<Entry>> {
        let key = Self::cache_key(credential);
        let mut cache = self.inner.lock().await;
        let hit = cache.get(&key).cloned();
        debug!(key = %key, hit = hit.is_some(), "Snapshot cache lookup");
        hit
    }

    /// Replace the snapshot for this credential
    pub async fn set(&self, credential: &str, entries: Vec<Entry>) {
        let key = Self::cache_key(credential);
        debug!(key = %key, entries = entries.len(), "Snapshot cache update");
        self.inner.lock().await.put(key, entries);
    }

    /// Drop the snapshot for this credential
    pub async fn invalidate(&self, credential: &str) {
        let key = Self::cache_key(credential);
        debug!(key = %key, "Snapshot cache invalidation");
        self.inner.lock().await.pop(&key);
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}
