//! Active background scan registry.
//!
//! Tracks at most one in-flight background scan per fingerprint:
//! `begin` hands out a cancellation flag only when no scan is already
//! registered. Cancellation is cooperative — the scanner polls its flag
//! at chunk boundaries, so a chunk already awaiting store I/O finishes
//! before the flag is honored.
//!
//! Join handles are retained so tests (and shutdown paths) can await a
//! scan deterministically instead of racing timers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::Fingerprint;

struct ActiveScan {
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

/// Shared registry of in-flight background scans.
#[derive(Clone, Default)]
pub struct ScanRegistry {
    inner: Arc<Mutex<HashMap<Fingerprint, ActiveScan>>>,
}

impl ScanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scan for `fingerprint` and return its cancel flag, or
    /// `None` when one is already in flight.
    pub async fn begin(&self, fingerprint: &Fingerprint) -> Option<Arc<AtomicBool>> {
        let mut map = self.inner.lock().await;
        if map.contains_key(fingerprint) {
            return None;
        }
        let cancel = Arc::new(AtomicBool::new(false));
        map.insert(
            fingerprint.clone(),
            ActiveScan {
                cancel: cancel.clone(),
                handle: None,
            },
        );
        Some(cancel)
    }

    /// Attach the spawned task's handle to an already-begun scan.
    pub async fn attach(&self, fingerprint: &Fingerprint, handle: JoinHandle<()>) {
        if let Some(scan) = self.inner.lock().await.get_mut(fingerprint) {
            scan.handle = Some(handle);
        }
    }

    /// Signal cancellation to every scan under a *different* fingerprint
    /// and drop them from the registry. Returns how many were flagged.
    ///
    /// Only one full-table background scan is meant to be live at a time;
    /// a new search supersedes old ones, while filter-only changes share
    /// the fingerprint and cancel nothing.
    pub async fn cancel_others(&self, keep: &Fingerprint) -> usize {
        let mut map = self.inner.lock().await;
        let mut cancelled = 0;
        map.retain(|fingerprint, scan| {
            if fingerprint == keep {
                return true;
            }
            debug!(fingerprint = %fingerprint, "Cancelling superseded background scan");
            scan.cancel.store(true, Ordering::Relaxed);
            cancelled += 1;
            false
        });
        cancelled
    }

    /// Remove a finished scan's entry (no-op when already removed by
    /// cancellation).
    pub async fn finish(&self, fingerprint: &Fingerprint) {
        self.inner.lock().await.remove(fingerprint);
    }

    /// True when a scan is registered for the fingerprint.
    pub async fn is_active(&self, fingerprint: &Fingerprint) -> bool {
        self.inner.lock().await.contains_key(fingerprint)
    }

    /// Await the registered task for a fingerprint, if any.
    ///
    /// Takes the handle out of the registry; intended for tests and
    /// shutdown, not the request path.
    pub async fn wait(&self, fingerprint: &Fingerprint) {
        let handle = {
            let mut map = self.inner.lock().await;
            map.get_mut(fingerprint).and_then(|scan| scan.handle.take())
        };
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}
