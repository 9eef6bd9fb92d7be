//! Query-string coercion for the sales endpoint.
//!
//! Everything arrives as an optional string and is coerced the way a
//! dashboard URL has to be: blank filters read as absent, unparseable
//! numbers fall back to defaults, and unknown sort fields fall back to
//! the date sort instead of erroring.

use serde::Deserialize;

use salescope_core::{defaults, SalesQuery, SortKey, SortOrder};

/// Raw query parameters of `GET /api/sales`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesParams {
    pub search: Option<String>,
    pub region: Option<String>,
    pub gender: Option<String>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub age_min: Option<String>,
    pub age_max: Option<String>,
    pub tags: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl SalesParams {
    /// Coerce the raw parameters into a well-formed query.
    pub fn into_query(self) -> SalesQuery {
        SalesQuery {
            search: self.search.unwrap_or_default(),
            region: non_blank(self.region),
            gender: non_blank(self.gender),
            category: non_blank(self.category),
            payment_method: non_blank(self.payment_method),
            age_min: parse_f64(self.age_min.as_deref()),
            age_max: parse_f64(self.age_max.as_deref()),
            tags: non_blank(self.tags),
            date_from: non_blank(self.date_from),
            date_to: non_blank(self.date_to),
            sort_by: SortKey::from_param(self.sort_by.as_deref().unwrap_or_default()),
            sort_order: SortOrder::from_param(self.sort_order.as_deref().unwrap_or_default()),
            page: parse_u32(self.page.as_deref(), defaults::DEFAULT_PAGE),
            page_size: parse_u32(self.page_size.as_deref(), defaults::DEFAULT_PAGE_SIZE),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_f64(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse().ok())
}

fn parse_u32(value: Option<&str>, default: u32) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&v| v >= 1)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let query = SalesParams::default().into_query();
        assert_eq!(query, SalesQuery::default());
    }

    #[test]
    fn test_blank_filters_read_as_absent() {
        let params = SalesParams {
            region: Some("  ".to_string()),
            gender: Some(String::new()),
            tags: Some("wireless".to_string()),
            ..Default::default()
        };
        let query = params.into_query();
        assert_eq!(query.region, None);
        assert_eq!(query.gender, None);
        assert_eq!(query.tags.as_deref(), Some("wireless"));
    }

    #[test]
    fn test_malformed_numbers_fall_back() {
        let params = SalesParams {
            page: Some("abc".to_string()),
            page_size: Some("0".to_string()),
            age_min: Some("not-a-number".to_string()),
            age_max: Some("65".to_string()),
            ..Default::default()
        };
        let query = params.into_query();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 10);
        assert_eq!(query.age_min, None);
        assert_eq!(query.age_max, Some(65.0));
    }

    #[test]
    fn test_sort_parameters() {
        let params = SalesParams {
            sort_by: Some("Quantity".to_string()),
            sort_order: Some("asc".to_string()),
            ..Default::default()
        };
        let query = params.into_query();
        assert_eq!(query.sort_by, SortKey::Quantity);
        assert_eq!(query.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_unknown_sort_falls_back_to_date_desc() {
        let params = SalesParams {
            sort_by: Some("Profit".to_string()),
            sort_order: Some("sideways".to_string()),
            ..Default::default()
        };
        let query = params.into_query();
        assert_eq!(query.sort_by, SortKey::Date);
        assert_eq!(query.sort_order, SortOrder::Desc);
    }
}
