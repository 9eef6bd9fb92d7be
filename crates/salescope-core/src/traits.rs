//! Core traits for salescope abstractions.
//!
//! The backing store is treated as an opaque paged-scan primitive: it
//! returns a batch of records plus an optional continuation token, and
//! optionally evaluates a native predicate server-side. Implementations
//! are injected into the engine, keeping tests deterministic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::SalesRecord;
use crate::predicate::ScanPredicate;

/// Opaque continuation cursor returned by a partial scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanToken(String);

impl ScanToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One paged scan request.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    /// Maximum items examined by the store in this chunk (pre-predicate).
    pub limit: usize,
    /// Resume point from a previous chunk; `None` starts from the top.
    pub start_token: Option<ScanToken>,
    /// Optional server-evaluated predicate over a subset of fields.
    pub predicate: Option<ScanPredicate>,
}

/// One chunk of scan output.
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    pub items: Vec<SalesRecord>,
    /// Absent when the table is exhausted.
    pub next_token: Option<ScanToken>,
}

/// Paged full-table scan over the sales table.
#[async_trait]
pub trait RecordScanner: Send + Sync {
    /// Scan the next chunk of records.
    ///
    /// The store examines up to `limit` items; when a predicate is given
    /// it is applied to the examined items before they are returned, so a
    /// chunk may come back smaller than `limit` (or empty) while a
    /// continuation token remains.
    async fn scan(&self, req: ScanRequest) -> Result<ScanPage>;
}
