//! Background continuation scanner.
//!
//! When a foreground scan stops early (quick return or budget pause with
//! budget remaining), a detached task resumes it: chunk after chunk until
//! the table is exhausted, the budget is hit, or a newer search cancels
//! it. Each chunk's matches are merged into the cache sorted, so requests
//! arriving mid-scan see progressively more complete results.
//!
//! Failures here are logged and swallowed — no caller is waiting. The
//! entry's running flag and the registry slot are always cleared, and the
//! TTL eventually rebuilds an entry whose scan died mid-way.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use salescope_core::{matches_search, sort_records, RecordScanner, Result, SalesQuery, ScanRequest};

use crate::cache::{CacheEntry, Fingerprint, ResultCache};
use crate::orchestrator::{EngineConfig, SalesEngine};

/// Start (or decline to start) a continuation scan for a cache entry.
///
/// Declines when the entry is gone, already complete, already owned by a
/// running task, or the registry holds a scan for this fingerprint.
pub(crate) async fn spawn_continuation(
    engine: &SalesEngine,
    fingerprint: Fingerprint,
    query: SalesQuery,
) {
    let Some(entry) = engine.cache.get(&fingerprint).await else {
        return;
    };
    if entry.background_running || entry.next_token.is_none() {
        return;
    }
    let Some(cancel) = engine.registry.begin(&fingerprint).await else {
        return;
    };

    engine
        .cache
        .update_with(&fingerprint, |e| e.background_running = true)
        .await;

    debug!(
        fingerprint = %fingerprint,
        scanned = entry.scanned_count,
        "Starting background continuation scan"
    );

    let scanner = engine.scanner.clone();
    let cache = engine.cache.clone();
    let registry = engine.registry.clone();
    let config = engine.config.clone();
    let task_fingerprint = fingerprint.clone();

    let handle = tokio::spawn(async move {
        let outcome = run_continuation(
            scanner,
            cache.clone(),
            config,
            task_fingerprint.clone(),
            query,
            cancel,
        )
        .await;

        if let Err(err) = outcome {
            warn!(
                fingerprint = %task_fingerprint,
                error = %err,
                "Background scan failed"
            );
            cache
                .update_with(&task_fingerprint, |e| e.background_running = false)
                .await;
        }
        registry.finish(&task_fingerprint).await;
    });

    engine.registry.attach(&fingerprint, handle).await;
}

async fn run_continuation(
    scanner: Arc<dyn RecordScanner>,
    cache: ResultCache,
    config: EngineConfig,
    fingerprint: Fingerprint,
    query: SalesQuery,
    cancel: Arc<AtomicBool>,
) -> Result<()> {
    let search = query.normalized_search();

    let Some(entry) = cache.get(&fingerprint).await else {
        return Ok(());
    };
    let mut matches = entry.records;
    let mut scanned = entry.scanned_count;
    let mut token = entry.next_token;

    while token.is_some() && scanned < config.max_scanned_items {
        if cancel.load(Ordering::Relaxed) {
            info!(fingerprint = %fingerprint, scanned, "Background scan cancelled");
            cache
                .update_with(&fingerprint, |e| e.background_running = false)
                .await;
            return Ok(());
        }

        let chunk = scanner
            .scan(ScanRequest {
                limit: config.scan_chunk_size,
                start_token: token.clone(),
                predicate: None,
            })
            .await?;

        scanned += chunk.items.len();
        let before = matches.len();
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

        // Merge growth into the cache after every chunk so concurrent
        // requests see progressive results.
        if matches.len() > before {
            debug!(
                fingerprint = %fingerprint,
                matches = matches.len(),
                scanned,
                "Background scan progress"
            );
            sort_records(&mut matches, query.sort_by, query.sort_order);
            let mut entry = CacheEntry::new(matches.clone(), scanned, token.clone());
            entry.background_running = true;
            cache.set(fingerprint.clone(), entry).await;
        }
    }

    sort_records(&mut matches, query.sort_by, query.sort_order);
    let complete = token.is_none();
    let entry = CacheEntry::new(matches, scanned, token);
    cache.set(fingerprint.clone(), entry).await;

    info!(
        fingerprint = %fingerprint,
        scanned,
        scan_complete = complete,
        "Background scan finished"
    );

    Ok(())
}
