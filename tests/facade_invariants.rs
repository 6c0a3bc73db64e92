//! Façade Invariant Tests
//!
//! - Per-call overrides always win over instance defaults
//! - `create` rejects an empty payload
//! - `upsert` creates when nothing matches, updates every match otherwise
//! - `read` concatenates pages in page order
//! - Column names with whitespace are braced in formulas

use std::sync::Arc;

use airtable_plus::{
    format_column_filter, AirtablePlus, Config, ConfigOverride, Fields, MemoryTableClient,
    PartialConfig, ReadParams,
};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

const BASE: &str = "appInvariants";

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

fn setup(page_size: usize) -> (Arc<MemoryTableClient>, AirtablePlus<Arc<MemoryTableClient>>) {
    let client = Arc::new(MemoryTableClient::with_page_size(page_size));
    let table = AirtablePlus::with_client(Config::new("keyTest", BASE, "Contacts"), client.clone());
    (client, table)
}

// =============================================================================
// Config Merge Precedence
// =============================================================================

/// Every overridable field takes the per-call value.
#[test]
fn test_override_always_wins() {
    let defaults = Config::new("keyA", "appA", "TableA")
        .with_camel_case(false)
        .with_no_retry_if_rate_limited(false);

    let merged = defaults.merge(
        &PartialConfig::new()
            .api_key("keyB")
            .base_id("appB")
            .table_name("TableB")
            .camel_case(true)
            .endpoint_url("http://localhost:9")
            .request_timeout_ms(10)
            .no_retry_if_rate_limited(true)
            .into(),
    );

    assert_eq!(merged.api_key, "keyB");
    assert_eq!(merged.base_id, "appB");
    assert_eq!(merged.table_name, "TableB");
    assert!(merged.camel_case);
    assert_eq!(merged.endpoint_url, "http://localhost:9");
    assert_eq!(merged.request_timeout_ms, 10);
    assert!(merged.no_retry_if_rate_limited);
}

/// Overrides apply to one call; the next call sees the defaults again.
#[tokio::test]
async fn test_override_is_per_call() {
    let (client, table) = setup(100);

    table
        .create(fields(json!({"Name": "a"})), "Leads")
        .await
        .unwrap();
    table
        .create(fields(json!({"Name": "b"})), ConfigOverride::None)
        .await
        .unwrap();

    assert_eq!(client.records(BASE, "Leads").len(), 1);
    assert_eq!(client.records(BASE, "Contacts").len(), 1);
    assert_eq!(table.config().table_name, "Contacts");
}

// =============================================================================
// Create Guards
// =============================================================================

#[tokio::test]
async fn test_create_rejects_empty_payload() {
    let (client, table) = setup(100);

    let err = table
        .create(Fields::new(), ConfigOverride::None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "AIRTABLE_INVALID_ARGUMENT");
    assert!(client.records(BASE, "Contacts").is_empty());
}

// =============================================================================
// Upsert
// =============================================================================

#[tokio::test]
async fn test_upsert_creates_when_no_row_matches() {
    let (client, table) = setup(100);
    client.seed(BASE, "Contacts", fields(json!({"Email": "other@example.com"})));

    let records = table
        .upsert(
            "Email",
            fields(json!({"Email": "ada@example.com", "Name": "Ada"})),
            ConfigOverride::None,
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("Name"), Some(&json!("Ada")));
    assert_eq!(client.records(BASE, "Contacts").len(), 2);
}

#[tokio::test]
async fn test_upsert_updates_every_matching_row() {
    let (client, table) = setup(1);
    let dup1 = client.seed(BASE, "Contacts", fields(json!({"Email": "ada@example.com"})));
    let dup2 = client.seed(BASE, "Contacts", fields(json!({"Email": "ada@example.com"})));
    client.seed(BASE, "Contacts", fields(json!({"Email": "grace@example.com"})));

    let records = table
        .upsert(
            "Email",
            fields(json!({"Email": "ada@example.com", "Status": "Active"})),
            ConfigOverride::None,
        )
        .await
        .unwrap();

    let mut ids: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
    ids.sort();
    assert_eq!(ids, vec![dup1.id, dup2.id]);

    let rows = client.records(BASE, "Contacts");
    assert_eq!(rows.len(), 3);
    let active = rows
        .iter()
        .filter(|r| r.get("Status") == Some(&json!("Active")))
        .count();
    assert_eq!(active, 2);
}

#[tokio::test]
async fn test_upsert_multi_word_key() {
    let (client, table) = setup(100);
    client.seed(BASE, "Contacts", fields(json!({"Full Name": "O'Brien", "Age": 40})));

    let records = table
        .upsert(
            "Full Name",
            fields(json!({"Full Name": "O'Brien", "Age": 41})),
            ConfigOverride::None,
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("Age"), Some(&json!(41)));
    assert_eq!(client.records(BASE, "Contacts").len(), 1);
}

#[tokio::test]
async fn test_upsert_requires_key_and_data() {
    let (_client, table) = setup(100);

    let missing_key = table
        .upsert("", fields(json!({"Email": "x"})), ConfigOverride::None)
        .await
        .unwrap_err();
    let missing_data = table
        .upsert("Email", Fields::new(), ConfigOverride::None)
        .await
        .unwrap_err();

    assert_eq!(missing_key.code(), "AIRTABLE_INVALID_ARGUMENT");
    assert_eq!(missing_data.code(), "AIRTABLE_INVALID_ARGUMENT");
}

// =============================================================================
// Read Pagination
// =============================================================================

#[tokio::test]
async fn test_read_concatenates_pages_in_order() {
    let (client, table) = setup(3);
    let seeded: Vec<_> = (0..10)
        .map(|i| client.seed(BASE, "Contacts", fields(json!({"Seq": i}))).id)
        .collect();

    let records = table
        .read(ReadParams::new(), ConfigOverride::None)
        .await
        .unwrap();

    let ids: Vec<_> = records.into_iter().map(|r| r.id).collect();
    assert_eq!(ids, seeded);
    // ceil(10 / 3) pages
    assert_eq!(client.call_count(), 4);
}

#[tokio::test]
async fn test_read_respects_max_records_across_pages() {
    let (client, table) = setup(2);
    for i in 0..7 {
        client.seed(BASE, "Contacts", fields(json!({"Seq": i})));
    }

    let records = table
        .read(ReadParams::new().max_records(5), ConfigOverride::None)
        .await
        .unwrap();
    assert_eq!(records.len(), 5);
}

// =============================================================================
// Column Formatting
// =============================================================================

#[test]
fn test_column_formatting() {
    assert_eq!(format_column_filter("Email"), "Email");
    assert_eq!(format_column_filter("Full Name"), "{Full Name}");

    let (_client, table) = setup(100);
    assert_eq!(table.format_column_filter("Last Contacted"), "{Last Contacted}");
}
