//! User-supplied query criteria: free-text search, per-field filters,
//! sort, and pagination.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Sortable record field. Defaults to `Date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    Date,
    Quantity,
    CustomerName,
}

impl SortKey {
    /// Parse a wire parameter, falling back to the default on anything
    /// unrecognized.
    pub fn from_param(value: &str) -> Self {
        match value {
            "Quantity" => Self::Quantity,
            "CustomerName" => Self::CustomerName,
            _ => Self::Date,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Quantity => "Quantity",
            Self::CustomerName => "CustomerName",
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::Date
    }
}

/// Sort direction. Defaults to descending (newest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_param(value: &str) -> Self {
        match value {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Desc
    }
}

/// The full set of user criteria for one dashboard request.
///
/// Unset filters impose no constraint. `page` is 1-based and `page_size`
/// is always positive; the API layer coerces malformed input before a
/// query is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesQuery {
    /// Free text matched against customer name and phone number.
    pub search: String,
    pub region: Option<String>,
    pub gender: Option<String>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub age_min: Option<f64>,
    pub age_max: Option<f64>,
    /// Comma-separated tag list; a record must contain every tag.
    pub tags: Option<String>,
    /// Inclusive lower date bound, as supplied on the wire.
    pub date_from: Option<String>,
    /// Inclusive upper date bound, as supplied on the wire.
    pub date_to: Option<String>,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub page: u32,
    pub page_size: u32,
}

impl Default for SalesQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            region: None,
            gender: None,
            category: None,
            payment_method: None,
            age_min: None,
            age_max: None,
            tags: None,
            date_from: None,
            date_to: None,
            sort_by: SortKey::default(),
            sort_order: SortOrder::default(),
            page: defaults::DEFAULT_PAGE,
            page_size: defaults::DEFAULT_PAGE_SIZE,
        }
    }
}

impl SalesQuery {
    /// Search text normalized for matching: trimmed and lowercased.
    pub fn normalized_search(&self) -> String {
        self.search.trim().to_lowercase()
    }

    /// True when any client-side filter criterion is set.
    pub fn has_filters(&self) -> bool {
        self.region.is_some()
            || self.gender.is_some()
            || self.category.is_some()
            || self.payment_method.is_some()
            || self.age_min.is_some()
            || self.age_max.is_some()
            || self.tags.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_from_param() {
        assert_eq!(SortKey::from_param("Quantity"), SortKey::Quantity);
        assert_eq!(SortKey::from_param("CustomerName"), SortKey::CustomerName);
        assert_eq!(SortKey::from_param("Date"), SortKey::Date);
        assert_eq!(SortKey::from_param("bogus"), SortKey::Date);
    }

    #[test]
    fn test_sort_order_from_param() {
        assert_eq!(SortOrder::from_param("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::from_param("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::from_param("sideways"), SortOrder::Desc);
    }

    #[test]
    fn test_default_query() {
        let query = SalesQuery::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 10);
        assert_eq!(query.sort_by, SortKey::Date);
        assert_eq!(query.sort_order, SortOrder::Desc);
        assert!(!query.has_filters());
    }

    #[test]
    fn test_normalized_search() {
        let query = SalesQuery {
            search: "  John ".to_string(),
            ..Default::default()
        };
        assert_eq!(query.normalized_search(), "john");
    }

    #[test]
    fn test_has_filters() {
        let query = SalesQuery {
            region: Some("West".to_string()),
            ..Default::default()
        };
        assert!(query.has_filters());

        let query = SalesQuery {
            search: "john".to_string(),
            ..Default::default()
        };
        // Search is not a filter; it changes the scan fingerprint instead.
        assert!(!query.has_filters());
    }
}
