//! TTL result cache for partial scan results.
//!
//! Entries are keyed by a fingerprint of (search text, sort key, sort
//! order) only — the remaining filter criteria are evaluated client-side
//! against the cached rows and must not change which records get scanned,
//! so a filter change reuses the entry as-is.
//!
//! The cache is an injected handle (cheap to clone, shared via `Arc`)
//! rather than a process-wide singleton, so tests can build isolated
//! instances. Entry read-modify-write happens under the map's write lock;
//! whole-entry `set` is last-writer-wins.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;

use salescope_core::{SalesRecord, ScanToken, SortKey, SortOrder};

/// Cache key derived from the scan-relevant query dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint the (normalized search, sort key, sort order) triple.
    pub fn new(search: &str, sort_by: SortKey, sort_order: SortOrder) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(search.as_bytes());
        hasher.update([0]);
        hasher.update(sort_by.as_str().as_bytes());
        hasher.update([0]);
        hasher.update(sort_order.as_str().as_bytes());
        let hash = hex::encode(hasher.finalize());
        Self(hash[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulated scan state for one fingerprint.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Matches accumulated so far (post-search-filter, pre-other-filters),
    /// kept sorted by the fingerprint's sort.
    pub records: Vec<SalesRecord>,
    /// Items examined by the store so far, matches or not.
    pub scanned_count: usize,
    /// Resume point; absent once the table is exhausted.
    pub next_token: Option<ScanToken>,
    pub scan_complete: bool,
    /// A background continuation task currently owns this entry.
    pub background_running: bool,
    /// Refreshed on every `set`, including incremental background merges.
    pub updated_at: Instant,
}

impl CacheEntry {
    pub fn new(
        records: Vec<SalesRecord>,
        scanned_count: usize,
        next_token: Option<ScanToken>,
    ) -> Self {
        Self {
            records,
            scanned_count,
            scan_complete: next_token.is_none(),
            next_token,
            background_running: false,
            updated_at: Instant::now(),
        }
    }
}

/// Shared TTL cache mapping fingerprints to scan state.
#[derive(Clone)]
pub struct ResultCache {
    inner: Arc<RwLock<HashMap<Fingerprint, CacheEntry>>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Snapshot an entry.
    pub async fn get(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        self.inner.read().await.get(fingerprint).cloned()
    }

    /// Replace an entry wholesale, refreshing its TTL timestamp.
    pub async fn set(&self, fingerprint: Fingerprint, mut entry: CacheEntry) {
        entry.updated_at = Instant::now();
        self.inner.write().await.insert(fingerprint, entry);
    }

    /// Mutate an entry in place under the write lock.
    ///
    /// Does not refresh the TTL timestamp; flag flips (e.g. clearing
    /// `background_running`) should not keep a stale entry alive. Returns
    /// false when the entry no longer exists.
    pub async fn update_with<F>(&self, fingerprint: &Fingerprint, f: F) -> bool
    where
        F: FnOnce(&mut CacheEntry),
    {
        let mut map = self.inner.write().await;
        match map.get_mut(fingerprint) {
            Some(entry) => {
                f(entry);
                true
            }
            None => false,
        }
    }

    /// Drop entries older than the TTL, complete or not. Returns the
    /// number evicted.
    pub async fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut map = self.inner.write().await;
        let before = map.len();
        map.retain(|_, entry| now.duration_since(entry.updated_at) <= self.ttl);
        let evicted = before - map.len();
        if evicted > 0 {
            debug!(evicted, remaining = map.len(), "Evicted expired cache entries");
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CacheEntry {
        CacheEntry::new(Vec::new(), 100, Some(ScanToken::new("100")))
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = Fingerprint::new("john", SortKey::Date, SortOrder::Desc);
        let b = Fingerprint::new("john", SortKey::Date, SortOrder::Desc);
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 16);
    }

    #[test]
    fn test_fingerprint_varies_by_dimension() {
        let base = Fingerprint::new("john", SortKey::Date, SortOrder::Desc);
        assert_ne!(base, Fingerprint::new("jane", SortKey::Date, SortOrder::Desc));
        assert_ne!(base, Fingerprint::new("john", SortKey::Quantity, SortOrder::Desc));
        assert_ne!(base, Fingerprint::new("john", SortKey::Date, SortOrder::Asc));
    }

    #[test]
    fn test_entry_completion_follows_token() {
        let complete = CacheEntry::new(Vec::new(), 10, None);
        assert!(complete.scan_complete);
        assert!(!entry().scan_complete);
    }

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let cache = ResultCache::new(Duration::from_secs(300));
        let fp = Fingerprint::new("", SortKey::Date, SortOrder::Desc);

        assert!(cache.get(&fp).await.is_none());
        cache.set(fp.clone(), entry()).await;

        let got = cache.get(&fp).await.unwrap();
        assert_eq!(got.scanned_count, 100);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_with_mutates_in_place() {
        let cache = ResultCache::new(Duration::from_secs(300));
        let fp = Fingerprint::new("", SortKey::Date, SortOrder::Desc);
        cache.set(fp.clone(), entry()).await;

        let updated = cache
            .update_with(&fp, |e| e.background_running = true)
            .await;
        assert!(updated);
        assert!(cache.get(&fp).await.unwrap().background_running);

        let missing = Fingerprint::new("other", SortKey::Date, SortOrder::Desc);
        assert!(!cache.update_with(&missing, |_| {}).await);
    }

    #[tokio::test]
    async fn test_evict_expired() {
        let cache = ResultCache::new(Duration::from_millis(0));
        let fp = Fingerprint::new("", SortKey::Date, SortOrder::Desc);
        cache.set(fp.clone(), entry()).await;

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.evict_expired().await, 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_fresh_entries_survive_eviction() {
        let cache = ResultCache::new(Duration::from_secs(300));
        let fp = Fingerprint::new("", SortKey::Date, SortOrder::Desc);
        cache.set(fp.clone(), entry()).await;

        assert_eq!(cache.evict_expired().await, 0);
        assert!(cache.get(&fp).await.is_some());
    }
}
