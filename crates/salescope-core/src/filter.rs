//! Client-side record filtering.
//!
//! These are the criteria the store cannot evaluate for us: the
//! case-insensitive free-text search, the loosely typed age range, and
//! everything that must stay out of the scan predicate so cached scan
//! results remain reusable across filter changes. Each criterion is
//! independent and conjunctive; absent criteria impose no constraint.

use crate::models::{parse_timestamp, SalesRecord};
use crate::query::SalesQuery;

/// True when the record matches the normalized search text.
///
/// Matches the lowercased customer name or the raw phone number string;
/// empty search matches every record. `search` must already be trimmed
/// and lowercased (see [`SalesQuery::normalized_search`]).
pub fn matches_search(record: &SalesRecord, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    if record.name_lower().contains(search) {
        return true;
    }
    record
        .phone_number
        .as_deref()
        .is_some_and(|phone| phone.contains(search))
}

/// Narrow a record list by every client-side criterion in the query.
///
/// Records with a missing or non-numeric age are excluded when an age
/// bound is set; records with a missing or unparseable date are excluded
/// when a date bound is set. A present-but-unparseable query date bound
/// matches nothing.
pub fn apply_filters(records: Vec<SalesRecord>, query: &SalesQuery) -> Vec<SalesRecord> {
    let mut filtered = records;

    if let Some(region) = query.region.as_deref() {
        filtered.retain(|r| r.region.as_deref() == Some(region));
    }
    if let Some(gender) = query.gender.as_deref() {
        filtered.retain(|r| r.gender.as_deref() == Some(gender));
    }
    if let Some(category) = query.category.as_deref() {
        filtered.retain(|r| r.product_category.as_deref() == Some(category));
    }
    if let Some(payment_method) = query.payment_method.as_deref() {
        filtered.retain(|r| r.payment_method.as_deref() == Some(payment_method));
    }

    if let Some(min) = query.age_min {
        filtered.retain(|r| r.age_value().is_some_and(|age| age >= min));
    }
    if let Some(max) = query.age_max {
        filtered.retain(|r| r.age_value().is_some_and(|age| age <= max));
    }

    if let Some(from) = query.date_from.as_deref() {
        let bound = parse_timestamp(from);
        filtered.retain(|r| match (r.date_timestamp(), bound) {
            (Some(date), Some(bound)) => date >= bound,
            _ => false,
        });
    }
    if let Some(to) = query.date_to.as_deref() {
        let bound = parse_timestamp(to);
        filtered.retain(|r| match (r.date_timestamp(), bound) {
            (Some(date), Some(bound)) => date <= bound,
            _ => false,
        });
    }

    if let Some(tags) = query.tags.as_deref() {
        let wanted: Vec<&str> = tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        if !wanted.is_empty() {
            filtered.retain(|r| {
                let have = r.tags.as_deref().unwrap_or("");
                wanted.iter().all(|tag| have.contains(tag))
            });
        }
    }

    filtered
}
