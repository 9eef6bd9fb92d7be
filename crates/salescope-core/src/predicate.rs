//! Native predicate builder for the scan primitive.
//!
//! Translates the server-evaluable subset of filter criteria (exact-match
//! fields, date range, tag containment) into the store's expression form:
//! one clause per present filter, conjoined with `AND`, with `#name` and
//! `:value` placeholders resolved through side tables.
//!
//! Free-text search is excluded because the store's `contains()` is
//! case-sensitive, and the age range is excluded because ages are stored
//! as loosely typed values that are unsafe to compare server-side; both
//! run client-side instead.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::query::SalesQuery;

/// A store-native filter expression with placeholder tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanPredicate {
    /// Conjunction of clauses, e.g. `#region = :region AND contains(#tags, :tag0)`.
    pub expression: String,
    /// Placeholder name → store field name.
    pub names: BTreeMap<String, String>,
    /// Placeholder value key → literal value.
    pub values: BTreeMap<String, JsonValue>,
}

/// Build the native predicate for a query's server-evaluable filters.
///
/// Returns `None` when no eligible filter is present (full unfiltered
/// scan).
pub fn build_scan_predicate(query: &SalesQuery) -> Option<ScanPredicate> {
    let mut parts: Vec<String> = Vec::new();
    let mut names = BTreeMap::new();
    let mut values = BTreeMap::new();

    let mut add = |expr: String,
                   name_key: &str,
                   field: &str,
                   value_key: &str,
                   value: JsonValue,
                   parts: &mut Vec<String>| {
        parts.push(expr);
        names.insert(name_key.to_string(), field.to_string());
        values.insert(value_key.to_string(), value);
    };

    if let Some(region) = &query.region {
        add(
            "#region = :region".to_string(),
            "#region",
            "CustomerRegion",
            ":region",
            JsonValue::from(region.clone()),
            &mut parts,
        );
    }
    if let Some(gender) = &query.gender {
        add(
            "#gender = :gender".to_string(),
            "#gender",
            "Gender",
            ":gender",
            JsonValue::from(gender.clone()),
            &mut parts,
        );
    }
    if let Some(category) = &query.category {
        add(
            "#category = :category".to_string(),
            "#category",
            "ProductCategory",
            ":category",
            JsonValue::from(category.clone()),
            &mut parts,
        );
    }
    if let Some(payment_method) = &query.payment_method {
        add(
            "#pm = :pm".to_string(),
            "#pm",
            "PaymentMethod",
            ":pm",
            JsonValue::from(payment_method.clone()),
            &mut parts,
        );
    }
    if let Some(date_from) = &query.date_from {
        add(
            "#date >= :dateFrom".to_string(),
            "#date",
            "Date",
            ":dateFrom",
            JsonValue::from(date_from.clone()),
            &mut parts,
        );
    }
    if let Some(date_to) = &query.date_to {
        add(
            "#date <= :dateTo".to_string(),
            "#date",
            "Date",
            ":dateTo",
            JsonValue::from(date_to.clone()),
            &mut parts,
        );
    }
    if let Some(tags) = &query.tags {
        for (i, tag) in tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .enumerate()
        {
            add(
                format!("contains(#tags, :tag{i})"),
                "#tags",
                "Tags",
                &format!(":tag{i}"),
                JsonValue::from(tag),
                &mut parts,
            );
        }
    }

    if parts.is_empty() {
        return None;
    }

    Some(ScanPredicate {
        expression: parts.join(" AND "),
        names,
        values,
    })
}
