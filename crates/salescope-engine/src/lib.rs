//! # salescope-engine
//!
//! The incremental scan-and-cache layer. The backing store offers nothing
//! but a chunked full-table scan, so this crate works around the missing
//! full-text and range indexes: it drives foreground scan chunks with a
//! quick-return heuristic, caches partial results per (search, sort)
//! fingerprint with TTL eviction, and resumes incomplete scans in a
//! cancellable background task while requests keep being served from the
//! growing cache.

pub mod background;
pub mod cache;
pub mod memory;
pub mod orchestrator;
pub mod registry;

pub use cache::{CacheEntry, Fingerprint, ResultCache};
pub use memory::MemoryScanner;
pub use orchestrator::{EngineConfig, SalesEngine};
pub use registry::ScanRegistry;
