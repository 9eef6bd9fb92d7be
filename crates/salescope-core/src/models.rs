//! Record and wire types for salescope.
//!
//! The backing store is schemaless: records are immutable snapshots read
//! per scan chunk, with no fixed schema enforced. `SalesRecord` names the
//! fields the dashboard uses as typed optional fields and carries every
//! other field through untouched. Loosely typed scalars (age, quantity,
//! amounts arrive as either strings or numbers) are exposed through
//! accessors instead of raw dynamic lookups.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// One sales transaction as read from the store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(
        rename = "CustomerName",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_loose_string"
    )]
    pub customer_name: Option<String>,

    #[serde(
        rename = "PhoneNumber",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_loose_string"
    )]
    pub phone_number: Option<String>,

    #[serde(
        rename = "CustomerRegion",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_loose_string"
    )]
    pub region: Option<String>,

    #[serde(
        rename = "Gender",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_loose_string"
    )]
    pub gender: Option<String>,

    #[serde(
        rename = "ProductCategory",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_loose_string"
    )]
    pub product_category: Option<String>,

    #[serde(
        rename = "PaymentMethod",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_loose_string"
    )]
    pub payment_method: Option<String>,

    /// Containment-style tag string, e.g. `"wireless,gadgets,portable"`.
    #[serde(
        rename = "Tags",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_loose_string"
    )]
    pub tags: Option<String>,

    /// Transaction date as stored (ISO 8601 string in well-formed rows).
    #[serde(
        rename = "Date",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_loose_string"
    )]
    pub date: Option<String>,

    /// Loosely typed in the store: string or number.
    #[serde(rename = "Age", default, skip_serializing_if = "Option::is_none")]
    pub age: Option<JsonValue>,

    /// Loosely typed in the store: string or number.
    #[serde(rename = "Quantity", default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<JsonValue>,

    /// Loosely typed in the store: string or number.
    #[serde(rename = "TotalAmount", default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<JsonValue>,

    /// Passthrough for identifier fields and anything else the store holds.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, JsonValue>,
}

impl SalesRecord {
    /// Lowercased customer name; empty when missing.
    pub fn name_lower(&self) -> String {
        self.customer_name
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default()
    }

    /// Numeric age, if the stored value parses as a number.
    pub fn age_value(&self) -> Option<f64> {
        self.age.as_ref().and_then(scalar_to_f64)
    }

    /// Numeric quantity; missing or non-numeric values count as zero.
    pub fn quantity_value(&self) -> f64 {
        self.quantity
            .as_ref()
            .and_then(scalar_to_f64)
            .unwrap_or(0.0)
    }

    /// Numeric total amount, if the stored value parses as a number.
    pub fn total_amount_value(&self) -> Option<f64> {
        self.total_amount.as_ref().and_then(scalar_to_f64)
    }

    /// Transaction date as a Unix timestamp in milliseconds.
    ///
    /// `None` when the date is missing or unparseable; callers decide the
    /// ordering/filter policy for such rows.
    pub fn date_timestamp(&self) -> Option<i64> {
        self.date.as_deref().and_then(parse_timestamp)
    }

    /// Look up a field by its store-side name, rendered as a string.
    ///
    /// Used by scan backends to evaluate native predicates against a row.
    pub fn field_str(&self, name: &str) -> Option<String> {
        match name {
            "CustomerName" => self.customer_name.clone(),
            "PhoneNumber" => self.phone_number.clone(),
            "CustomerRegion" => self.region.clone(),
            "Gender" => self.gender.clone(),
            "ProductCategory" => self.product_category.clone(),
            "PaymentMethod" => self.payment_method.clone(),
            "Tags" => self.tags.clone(),
            "Date" => self.date.clone(),
            "Age" => self.age.as_ref().and_then(scalar_to_string),
            "Quantity" => self.quantity.as_ref().and_then(scalar_to_string),
            "TotalAmount" => self.total_amount.as_ref().and_then(scalar_to_string),
            other => self.extra.get(other).and_then(scalar_to_string),
        }
    }
}

/// Parse a stored date string into a Unix timestamp in milliseconds.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` (assumed UTC),
/// `YYYY-MM-DD HH:MM:SS`, and bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(ndt.and_utc().timestamp_millis());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(ndt.and_utc().timestamp_millis());
    }
    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(nd.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
    }
    None
}

fn scalar_to_f64(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accept string, number, or bool where a string field is expected;
/// anything else (including null) reads as absent.
fn de_loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string))
}

/// Pagination metadata returned alongside every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub has_next_page: bool,
    /// Count of rows matching every filter, across all pages.
    pub total_filtered: usize,
}

/// One page of filtered, sorted results — the wire response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesPage {
    pub items: Vec<SalesRecord>,
    pub page_info: PageInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_deserializes_loose_scalars() {
        let record: SalesRecord = serde_json::from_value(json!({
            "CustomerName": "John Smith",
            "Age": "35",
            "Quantity": 3,
            "TotalAmount": "120.50",
            "TransactionId": "tx-0042"
        }))
        .unwrap();

        assert_eq!(record.customer_name.as_deref(), Some("John Smith"));
        assert_eq!(record.age_value(), Some(35.0));
        assert_eq!(record.quantity_value(), 3.0);
        assert_eq!(record.total_amount_value(), Some(120.5));
        assert_eq!(
            record.extra.get("TransactionId"),
            Some(&json!("tx-0042"))
        );
    }

    #[test]
    fn test_non_numeric_age_is_none() {
        let record: SalesRecord =
            serde_json::from_value(json!({ "Age": "abc" })).unwrap();
        assert_eq!(record.age_value(), None);
    }

    #[test]
    fn test_missing_quantity_counts_as_zero() {
        let record = SalesRecord::default();
        assert_eq!(record.quantity_value(), 0.0);
    }

    #[test]
    fn test_numeric_customer_name_coerced() {
        let record: SalesRecord =
            serde_json::from_value(json!({ "CustomerName": 42 })).unwrap();
        assert_eq!(record.customer_name.as_deref(), Some("42"));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-15T10:30:00Z").is_some());
        assert!(parse_timestamp("2024-01-15T10:30:00").is_some());
        assert!(parse_timestamp("2024-01-15 10:30:00").is_some());
        assert!(parse_timestamp("2024-01-15").is_some());
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_parse_timestamp_date_only_is_midnight() {
        let midnight = parse_timestamp("2024-01-15").unwrap();
        let explicit = parse_timestamp("2024-01-15T00:00:00Z").unwrap();
        assert_eq!(midnight, explicit);
    }

    #[test]
    fn test_field_str_lookup() {
        let record: SalesRecord = serde_json::from_value(json!({
            "CustomerRegion": "West",
            "Age": 35,
            "OrderId": 7
        }))
        .unwrap();

        assert_eq!(record.field_str("CustomerRegion").as_deref(), Some("West"));
        assert_eq!(record.field_str("Age").as_deref(), Some("35"));
        assert_eq!(record.field_str("OrderId").as_deref(), Some("7"));
        assert_eq!(record.field_str("Missing"), None);
    }

    #[test]
    fn test_page_info_serializes_camel_case() {
        let info = PageInfo {
            page: 2,
            page_size: 10,
            has_next_page: true,
            total_filtered: 42,
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(
            value,
            json!({ "page": 2, "pageSize": 10, "hasNextPage": true, "totalFiltered": 42 })
        );
    }
}
