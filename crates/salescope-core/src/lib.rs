//! # salescope-core
//!
//! Core types, traits, and abstractions for the salescope service.
//!
//! This crate provides the record and query models, the scan-primitive
//! trait, and the pure filter/sort/paginate logic that the engine and
//! API crates build on.

pub mod defaults;
pub mod error;
pub mod filter;
pub mod models;
pub mod ordering;
pub mod predicate;
pub mod query;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use filter::{apply_filters, matches_search};
pub use models::{parse_timestamp, PageInfo, SalesPage, SalesRecord};
pub use ordering::{paginate, sort_records};
pub use predicate::{build_scan_predicate, ScanPredicate};
pub use query::{SalesQuery, SortKey, SortOrder};
pub use traits::{RecordScanner, ScanPage, ScanRequest, ScanToken};
