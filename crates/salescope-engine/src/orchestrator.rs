//! Scan orchestration: the request path of the engine.
//!
//! `fetch_page` answers one dashboard query by combining the result
//! cache, a bounded foreground scan loop, and the background continuation
//! scanner. Cache entries are keyed by (search, sort) only, so the
//! foreground scan never pushes a server-side predicate down to the
//! store — the same scanned set must stay valid when only filters change.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use salescope_core::{
    apply_filters, defaults, matches_search, paginate, sort_records, RecordScanner, Result,
    SalesPage, SalesQuery, ScanRequest,
};

use crate::cache::{CacheEntry, Fingerprint, ResultCache};
use crate::registry::ScanRegistry;

/// Configuration for the scan engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Items requested per scan chunk.
    pub scan_chunk_size: usize,
    /// Per-fingerprint budget of examined items before a scan gives up.
    pub max_scanned_items: usize,
    /// Pages of look-ahead accumulated before a first-page request
    /// returns early while a continuation token remains.
    pub scan_ahead_pages: usize,
    /// Result cache time-to-live.
    pub cache_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scan_chunk_size: defaults::SCAN_CHUNK_SIZE,
            max_scanned_items: defaults::MAX_SCANNED_ITEMS,
            scan_ahead_pages: defaults::SCAN_AHEAD_PAGES,
            cache_ttl: Duration::from_secs(defaults::CACHE_TTL_SECS),
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `SCAN_CHUNK_SIZE` | `100000` | Items per scan chunk |
    /// | `SCAN_MAX_ITEMS` | `1000000` | Scanned-item budget per fingerprint |
    /// | `SCAN_AHEAD_PAGES` | `50` | Look-ahead pages before quick return |
    /// | `CACHE_TTL_SECS` | `300` | Result cache TTL |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let scan_chunk_size = std::env::var("SCAN_CHUNK_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.scan_chunk_size)
            .max(1);

        let max_scanned_items = std::env::var("SCAN_MAX_ITEMS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.max_scanned_items)
            .max(1);

        let scan_ahead_pages = std::env::var("SCAN_AHEAD_PAGES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.scan_ahead_pages);

        let cache_ttl = std::env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);

        Self {
            scan_chunk_size,
            max_scanned_items,
            scan_ahead_pages,
            cache_ttl,
        }
    }

    /// Set the scan chunk size.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.scan_chunk_size = size.max(1);
        self
    }

    /// Set the scanned-item budget.
    pub fn with_max_scanned(mut self, max: usize) -> Self {
        self.max_scanned_items = max.max(1);
        self
    }

    /// Set the look-ahead window in pages.
    pub fn with_scan_ahead_pages(mut self, pages: usize) -> Self {
        self.scan_ahead_pages = pages;
        self
    }

    /// Set the cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

/// The scan-and-cache engine serving dashboard queries.
pub struct SalesEngine {
    pub(crate) scanner: Arc<dyn RecordScanner>,
    pub(crate) cache: ResultCache,
    pub(crate) registry: ScanRegistry,
    pub(crate) config: EngineConfig,
}

impl SalesEngine {
    pub fn new(scanner: Arc<dyn RecordScanner>, config: EngineConfig) -> Self {
        let cache = ResultCache::new(config.cache_ttl);
        Self {
            scanner,
            cache,
            registry: ScanRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The cache fingerprint a query resolves to.
    pub fn fingerprint_for(query: &SalesQuery) -> Fingerprint {
        Fingerprint::new(&query.normalized_search(), query.sort_by, query.sort_order)
    }

    /// Snapshot the cache entry backing a query, if any.
    pub async fn cached_entry(&self, query: &SalesQuery) -> Option<CacheEntry> {
        self.cache.get(&Self::fingerprint_for(query)).await
    }

    /// True when a background scan is registered for the query's
    /// fingerprint.
    pub async fn background_active(&self, query: &SalesQuery) -> bool {
        self.registry.is_active(&Self::fingerprint_for(query)).await
    }

    /// Await the background scan for a query's fingerprint, if one is
    /// running. Intended for tests and shutdown.
    pub async fn wait_for_background(&self, query: &SalesQuery) {
        self.registry.wait(&Self::fingerprint_for(query)).await;
    }

    /// Serve one page of filtered, sorted results, scanning only as much
    /// of the table as needed.
    pub async fn fetch_page(&self, query: &SalesQuery) -> Result<SalesPage> {
        let started = Instant::now();
        let page = query.page.max(1) as usize;
        let size = query.page_size.max(1) as usize;
        let search = query.normalized_search();
        let fingerprint = Self::fingerprint_for(query);

        debug!(
            fingerprint = %fingerprint,
            page,
            page_size = size,
            search = %search,
            has_filters = query.has_filters(),
            "Fetching sales page"
        );

        // A new search supersedes background scans for other searches;
        // filter-only changes share the fingerprint and cancel nothing.
        let cancelled = self.registry.cancel_others(&fingerprint).await;
        if cancelled > 0 {
            debug!(cancelled, "Flagged superseded background scans");
        }

        let cached = self.cache.get(&fingerprint).await;

        if let Some(entry) = &cached {
            let filtered = apply_filters(entry.records.clone(), query);
            let needed = page * size;

            if filtered.len() >= needed || entry.scan_complete {
                debug!(
                    fingerprint = %fingerprint,
                    cached = entry.records.len(),
                    filtered = filtered.len(),
                    scan_complete = entry.scan_complete,
                    "Serving from cache"
                );
                if !entry.scan_complete && entry.next_token.is_some() {
                    crate::background::spawn_continuation(self, fingerprint.clone(), query.clone())
                        .await;
                }
                return Ok(paginate(&filtered, page, size));
            }

            debug!(
                have = filtered.len(),
                needed,
                "Cached entry cannot fill the page, resuming foreground scan"
            );
        }

        // Foreground scan, resuming from cached progress when present.
        let mut matches = cached
            .as_ref()
            .map(|e| e.records.clone())
            .unwrap_or_default();
        let mut scanned = cached.as_ref().map(|e| e.scanned_count).unwrap_or(0);
        let mut token = cached.as_ref().and_then(|e| e.next_token.clone());

        loop {
            let chunk = self
                .scanner
                .scan(ScanRequest {
                    limit: self.config.scan_chunk_size,
                    start_token: token.clone(),
                    predicate: None,
                })
                .await?;

            scanned += chunk.items.len();
            if search.is_empty() {
                matches.extend(chunk.items);
            } else {
                matches.extend(
                    chunk
                        .items
                        .into_iter()
                        .filter(|record| matches_search(record, &search)),
                );
            }
            token = chunk.next_token;

            // First-page requests return as soon as enough matches exist
            // to pre-fill the look-ahead window; the background scanner
            // picks up from here.
            let look_ahead = page * size + self.config.scan_ahead_pages * size;
            if page == 1 && matches.len() >= look_ahead && token.is_some() {
                debug!(
                    matches = matches.len(),
                    look_ahead, "Quick return with look-ahead window filled"
                );
                break;
            }

            if scanned >= self.config.max_scanned_items {
                warn!(
                    scanned,
                    budget = self.config.max_scanned_items,
                    "Scan budget exhausted"
                );
                break;
            }

            if token.is_none() {
                break;
            }
        }

        sort_records(&mut matches, query.sort_by, query.sort_order);

        let entry = CacheEntry::new(matches.clone(), scanned, token.clone());
        let incomplete = !entry.scan_complete;
        self.cache.set(fingerprint.clone(), entry).await;

        if incomplete {
            crate::background::spawn_continuation(self, fingerprint.clone(), query.clone()).await;
        }

        self.cache.evict_expired().await;

        let filtered = apply_filters(matches, query);
        let result = paginate(&filtered, page, size);

        info!(
            fingerprint = %fingerprint,
            scanned,
            result_count = result.items.len(),
            total_filtered = result.page_info.total_filtered,
            scan_complete = !incomplete,
            duration_ms = started.elapsed().as_millis() as u64,
            "Foreground scan served page"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.scan_chunk_size, defaults::SCAN_CHUNK_SIZE);
        assert_eq!(config.max_scanned_items, defaults::MAX_SCANNED_ITEMS);
        assert_eq!(config.scan_ahead_pages, defaults::SCAN_AHEAD_PAGES);
        assert_eq!(config.cache_ttl, Duration::from_secs(defaults::CACHE_TTL_SECS));
    }

    #[test]
    fn test_engine_config_builder() {
        let config = EngineConfig::default()
            .with_chunk_size(5)
            .with_max_scanned(100)
            .with_scan_ahead_pages(2)
            .with_cache_ttl(Duration::from_secs(1));

        assert_eq!(config.scan_chunk_size, 5);
        assert_eq!(config.max_scanned_items, 100);
        assert_eq!(config.scan_ahead_pages, 2);
        assert_eq!(config.cache_ttl, Duration::from_secs(1));
    }

    #[test]
    fn test_engine_config_floors_zero_sizes() {
        let config = EngineConfig::default().with_chunk_size(0).with_max_scanned(0);
        assert_eq!(config.scan_chunk_size, 1);
        assert_eq!(config.max_scanned_items, 1);
    }

    #[test]
    fn test_fingerprint_ignores_filters_and_pagination() {
        let base = SalesQuery {
            search: "john".to_string(),
            ..Default::default()
        };
        let with_filters = SalesQuery {
            region: Some("West".to_string()),
            age_min: Some(30.0),
            page: 7,
            page_size: 25,
            ..base.clone()
        };
        assert_eq!(
            SalesEngine::fingerprint_for(&base),
            SalesEngine::fingerprint_for(&with_filters)
        );
    }

    #[test]
    fn test_fingerprint_normalizes_search() {
        let padded = SalesQuery {
            search: "  John ".to_string(),
            ..Default::default()
        };
        let plain = SalesQuery {
            search: "john".to_string(),
            ..Default::default()
        };
        assert_eq!(
            SalesEngine::fingerprint_for(&padded),
            SalesEngine::fingerprint_for(&plain)
        );
    }
}
