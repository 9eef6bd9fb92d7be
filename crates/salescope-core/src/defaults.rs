//! Centralized default constants for the salescope system.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// SCANNING
// =============================================================================

/// Maximum items scanned per request before giving up (bounds worst-case
/// cost against a full-table-scan-only backend).
pub const MAX_SCANNED_ITEMS: usize = 1_000_000;

/// Items requested per scan chunk. Large chunks keep a full-table pass
/// cheap when only the search filter runs per chunk.
pub const SCAN_CHUNK_SIZE: usize = 100_000;

/// Pages of look-ahead accumulated before a first-page request returns
/// early (500 items at the default page size).
pub const SCAN_AHEAD_PAGES: usize = 50;

// =============================================================================
// CACHING
// =============================================================================

/// Result cache time-to-live in seconds, measured from the last full
/// write or incremental background update.
pub const CACHE_TTL_SECS: u64 = 300;

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page number (1-based).
pub const DEFAULT_PAGE: u32 = 1;

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;
