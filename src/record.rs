//! # Records
//!
//! Stable response shapes returned by every façade operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{AirtableError, AirtableResult};

/// Column name → cell value
pub type Fields = Map<String, Value>;

/// One row of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Record identifier (`rec...`)
    pub id: String,

    /// Cell values; empty cells are omitted by the service
    #[serde(default)]
    pub fields: Fields,

    /// Creation timestamp (ISO 8601)
    pub created_time: String,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Fields, created_time: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields,
            created_time: created_time.into(),
        }
    }

    /// Get a field value
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Parse `created_time`
    pub fn created_at(&self) -> AirtableResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_time)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| {
                AirtableError::invalid_argument(format!(
                    "createdTime '{}' is not RFC 3339: {}",
                    self.created_time, e
                ))
            })
    }

    /// Rename every field to lowerCamelCase; `id` and `created_time` are untouched.
    ///
    /// When several columns map to the same name, the first one in key order
    /// keeps it and the others are dropped.
    pub fn into_camel_case(self) -> Self {
        let mut fields = Fields::new();
        for (column, value) in self.fields {
            fields.entry(camel_case(&column)).or_insert(value);
        }
        Self { fields, ..self }
    }
}

/// Delete acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedRecord {
    pub id: String,
    #[serde(default = "deleted_default")]
    pub deleted: bool,
}

fn deleted_default() -> bool {
    true
}

/// One page of a list response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub records: Vec<Record>,

    /// Cursor for the next page; absent on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

/// Convert a column name to lowerCamelCase.
///
/// Words are split on non-alphanumeric characters and on lower→upper
/// transitions, so `"First Name"`, `"first_name"` and `"firstName"` all
/// become `"firstName"`, and `"User ID"` becomes `"userId"`.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());

    for (i, word) in words(name).iter().enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }

    out
}

fn words(name: &str) -> Vec<String> {
    let mut words = Vec::new();

    for segment in name.split(|c: char| !c.is_alphanumeric()) {
        let mut current = String::new();
        let mut prev: Option<char> = None;
        for c in segment.chars() {
            let boundary = match prev {
                Some(p) => (p.is_lowercase() || p.is_numeric()) && c.is_uppercase(),
                None => false,
            };
            if boundary && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
            prev = Some(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }

    words
}

/// Build `Fields` from a JSON object literal
#[cfg(test)]
pub(crate) fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_deserializes_service_shape() {
        let record: Record = serde_json::from_value(json!({
            "id": "rec123",
            "createdTime": "2024-01-15T10:30:00.000Z",
            "fields": {"Name": "Alice", "Age": 30}
        }))
        .unwrap();

        assert_eq!(record.id, "rec123");
        assert_eq!(record.get("Name"), Some(&json!("Alice")));
        assert_eq!(record.created_time, "2024-01-15T10:30:00.000Z");
    }

    #[test]
    fn test_missing_fields_is_empty() {
        let record: Record = serde_json::from_value(json!({
            "id": "rec1",
            "createdTime": "2024-01-15T10:30:00.000Z"
        }))
        .unwrap();
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_created_at() {
        let record = Record::new("rec1", Fields::new(), "2024-01-15T10:30:00.000Z");
        let ts = record.created_at().unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-15T10:30:00+00:00");

        let bad = Record::new("rec1", Fields::new(), "yesterday");
        assert!(bad.created_at().is_err());
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("Name"), "name");
        assert_eq!(camel_case("First Name"), "firstName");
        assert_eq!(camel_case("first_name"), "firstName");
        assert_eq!(camel_case("firstName"), "firstName");
        assert_eq!(camel_case("User ID"), "userId");
        assert_eq!(camel_case("  Due   date (UTC) "), "dueDateUtc");
        assert_eq!(camel_case("Phase 2 Start"), "phase2Start");
    }

    #[test]
    fn test_into_camel_case_keeps_identity() {
        let mut fields = Fields::new();
        fields.insert("First Name".to_string(), json!("Ada"));
        let record = Record::new("recA", fields, "2024-01-15T10:30:00.000Z").into_camel_case();

        assert_eq!(record.id, "recA");
        assert_eq!(record.created_time, "2024-01-15T10:30:00.000Z");
        assert_eq!(record.get("firstName"), Some(&json!("Ada")));
        assert!(record.get("First Name").is_none());
    }

    #[test]
    fn test_into_camel_case_collision_keeps_first_column() {
        let record = Record::new(
            "recA",
            fields(json!({"First Name": "a", "first_name": "b"})),
            "2024-01-15T10:30:00.000Z",
        )
        .into_camel_case();

        assert_eq!(record.fields.len(), 1);
        assert_eq!(record.get("firstName"), Some(&json!("a")));
    }

    #[test]
    fn test_deleted_record_default() {
        let deleted: DeletedRecord = serde_json::from_value(json!({"id": "rec9"})).unwrap();
        assert!(deleted.deleted);
    }

    #[test]
    fn test_page_without_offset() {
        let page: Page = serde_json::from_value(json!({"records": []})).unwrap();
        assert!(page.offset.is_none());
    }
}
