//! Deterministic ordering and page slicing of in-memory result sets.

use std::cmp::Ordering;

use crate::models::{PageInfo, SalesPage, SalesRecord};
use crate::query::{SortKey, SortOrder};

/// Sort records in place by a single key.
///
/// Records whose sort value is missing or unparseable order last under
/// both directions (they never displace well-formed rows). Quantity
/// treats missing values as zero and customer names compare
/// case-insensitively, missing names as empty. Rust's sort is stable, so
/// ties keep their relative input order.
pub fn sort_records(records: &mut [SalesRecord], key: SortKey, order: SortOrder) {
    match key {
        SortKey::Date => {
            records.sort_by(|a, b| cmp_optional(a.date_timestamp(), b.date_timestamp(), order));
        }
        SortKey::Quantity => {
            records.sort_by(|a, b| directed(a.quantity_value().total_cmp(&b.quantity_value()), order));
        }
        SortKey::CustomerName => {
            records.sort_by(|a, b| directed(a.name_lower().cmp(&b.name_lower()), order));
        }
    }
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

// Missing values sort last regardless of direction, so only the
// Some/Some comparison is direction-sensitive.
fn cmp_optional(a: Option<i64>, b: Option<i64>, order: SortOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => directed(a.cmp(&b), order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Slice one page out of a sorted, fully filtered record list.
///
/// Returns the half-open slice `[(page-1)*size, page*size)` together with
/// pagination metadata; `has_next_page` is true iff rows remain past the
/// slice end.
pub fn paginate(records: &[SalesRecord], page: usize, page_size: usize) -> SalesPage {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(records.len());
    let items = if start < records.len() {
        records[start..end].to_vec()
    } else {
        Vec::new()
    };

    SalesPage {
        items,
        page_info: PageInfo {
            page,
            page_size,
            has_next_page: start + page_size < records.len(),
            total_filtered: records.len(),
        },
    }
}
