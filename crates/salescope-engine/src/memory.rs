//! In-memory scan backend.
//!
//! An ordered table with real chunked paging: the continuation token is
//! the next offset, and predicates are evaluated against each examined
//! row *after* the limit is applied, the way a scanning store charges for
//! items examined rather than items returned. Used as the development
//! backend and as the deterministic store for engine and API tests.

use std::path::Path;

use async_trait::async_trait;

use salescope_core::{
    Error, RecordScanner, Result, SalesRecord, ScanPage, ScanPredicate, ScanRequest, ScanToken,
};

/// Immutable in-memory sales table.
pub struct MemoryScanner {
    records: Vec<SalesRecord>,
}

impl MemoryScanner {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    /// Load a table from a JSON file holding an array of records.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("failed to read seed file: {e}")))?;
        let records: Vec<SalesRecord> = serde_json::from_str(&data)?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordScanner for MemoryScanner {
    async fn scan(&self, req: ScanRequest) -> Result<ScanPage> {
        let start = match &req.start_token {
            Some(token) => token
                .as_str()
                .parse::<usize>()
                .map_err(|_| Error::InvalidInput(format!("bad scan token: {}", token.as_str())))?,
            None => 0,
        };
        let limit = req.limit.max(1);
        let end = (start + limit).min(self.records.len());

        let mut items: Vec<SalesRecord> = self.records[start.min(end)..end].to_vec();
        if let Some(predicate) = &req.predicate {
            items.retain(|record| predicate_matches(predicate, record));
        }

        let next_token = (end < self.records.len()).then(|| ScanToken::new(end.to_string()));

        Ok(ScanPage { items, next_token })
    }
}

/// Evaluate a native predicate against one record.
///
/// Supports the clause forms the predicate builder emits: `#n = :v`,
/// `#n >= :v`, `#n <= :v`, and `contains(#n, :v)`, AND-conjoined.
/// Unresolvable placeholders or unknown clause forms fail closed.
fn predicate_matches(predicate: &ScanPredicate, record: &SalesRecord) -> bool {
    predicate
        .expression
        .split(" AND ")
        .all(|clause| clause_matches(predicate, record, clause.trim()))
}

fn clause_matches(predicate: &ScanPredicate, record: &SalesRecord, clause: &str) -> bool {
    if let Some(inner) = clause
        .strip_prefix("contains(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let Some((name_key, value_key)) = inner.split_once(',') else {
            return false;
        };
        let Some((field, value)) =
            resolve(predicate, name_key.trim(), value_key.trim())
        else {
            return false;
        };
        return record
            .field_str(&field)
            .is_some_and(|actual| actual.contains(&value));
    }

    let parts: Vec<&str> = clause.split_whitespace().collect();
    let [name_key, op, value_key] = parts.as_slice() else {
        return false;
    };
    let Some((field, value)) = resolve(predicate, name_key, value_key) else {
        return false;
    };
    let Some(actual) = record.field_str(&field) else {
        return false;
    };

    match *op {
        "=" => actual == value,
        // ISO date strings compare correctly as plain strings.
        ">=" => actual.as_str() >= value.as_str(),
        "<=" => actual.as_str() <= value.as_str(),
        _ => false,
    }
}

fn resolve(
    predicate: &ScanPredicate,
    name_key: &str,
    value_key: &str,
) -> Option<(String, String)> {
    let field = predicate.names.get(name_key)?.clone();
    let value = predicate.values.get(value_key)?;
    let value = match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Some((field, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use salescope_core::{build_scan_predicate, SalesQuery};
    use serde_json::json;

    fn record(fields: serde_json::Value) -> SalesRecord {
        serde_json::from_value(fields).unwrap()
    }

    fn table(n: usize) -> MemoryScanner {
        MemoryScanner::new(
            (0..n)
                .map(|i| record(json!({ "CustomerName": format!("c{i}") })))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_paged_scan_walks_whole_table() {
        let scanner = table(25);
        let mut token = None;
        let mut seen = 0;
        let mut chunks = 0;

        loop {
            let page = scanner
                .scan(ScanRequest {
                    limit: 10,
                    start_token: token,
                    predicate: None,
                })
                .await
                .unwrap();
            seen += page.items.len();
            chunks += 1;
            token = page.next_token;
            if token.is_none() {
                break;
            }
        }

        assert_eq!(seen, 25);
        assert_eq!(chunks, 3);
    }

    #[tokio::test]
    async fn test_final_chunk_has_no_token() {
        let scanner = table(10);
        let page = scanner
            .scan(ScanRequest {
                limit: 10,
                start_token: None,
                predicate: None,
            })
            .await
            .unwrap();
        assert_eq!(page.items.len(), 10);
        assert!(page.next_token.is_none());
    }

    #[tokio::test]
    async fn test_bad_token_is_rejected() {
        let scanner = table(5);
        let err = scanner
            .scan(ScanRequest {
                limit: 10,
                start_token: Some(ScanToken::new("not-a-number")),
                predicate: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_predicate_filters_within_chunk() {
        let scanner = MemoryScanner::new(vec![
            record(json!({ "CustomerRegion": "West", "Tags": "wireless,gadgets" })),
            record(json!({ "CustomerRegion": "East", "Tags": "wireless" })),
            record(json!({ "CustomerRegion": "West", "Tags": "audio" })),
        ]);
        let query = SalesQuery {
            region: Some("West".to_string()),
            tags: Some("wireless".to_string()),
            ..Default::default()
        };
        let predicate = build_scan_predicate(&query);

        let page = scanner
            .scan(ScanRequest {
                limit: 10,
                start_token: None,
                predicate,
            })
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].region.as_deref(), Some("West"));
    }

    #[tokio::test]
    async fn test_predicate_date_range_over_iso_strings() {
        let scanner = MemoryScanner::new(vec![
            record(json!({ "Date": "2024-01-10" })),
            record(json!({ "Date": "2024-02-10" })),
            record(json!({ "Date": "2024-03-10" })),
        ]);
        let query = SalesQuery {
            date_from: Some("2024-02-01".to_string()),
            date_to: Some("2024-02-28".to_string()),
            ..Default::default()
        };

        let page = scanner
            .scan(ScanRequest {
                limit: 10,
                start_token: None,
                predicate: build_scan_predicate(&query),
            })
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].date.as_deref(), Some("2024-02-10"));
    }

    #[tokio::test]
    async fn test_predicate_missing_field_fails_closed() {
        let scanner = MemoryScanner::new(vec![record(json!({}))]);
        let query = SalesQuery {
            region: Some("West".to_string()),
            ..Default::default()
        };

        let page = scanner
            .scan(ScanRequest {
                limit: 10,
                start_token: None,
                predicate: build_scan_predicate(&query),
            })
            .await
            .unwrap();

        assert!(page.items.is_empty());
    }
}
