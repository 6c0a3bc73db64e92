//! # In-memory table client
//!
//! Holds tables in process, keyed by base and table name. Pages listings
//! like the service does and understands equality formulas, which is the
//! subset the façade itself generates.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize};
use std::sync::{atomic, RwLock};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use super::TableClient;
use crate::config::Config;
use crate::errors::{AirtableError, AirtableResult};
use crate::params::{Direction, ReadParams, SortField, MAX_PAGE_SIZE};
use crate::record::{DeletedRecord, Fields, Page, Record};

type TableKey = (String, String);

/// In-memory `TableClient`
pub struct MemoryTableClient {
    /// (base, table) -> rows in insertion order
    tables: RwLock<HashMap<TableKey, Vec<Record>>>,

    /// Rows per page when the caller sets no page size
    page_size: usize,

    next_id: AtomicU64,

    /// Calls served, for asserting request counts
    calls: AtomicUsize,
}

impl Default for MemoryTableClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTableClient {
    pub fn new() -> Self {
        Self::with_page_size(MAX_PAGE_SIZE as usize)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            page_size: page_size.max(1),
            next_id: AtomicU64::new(1),
            calls: AtomicUsize::new(0),
        }
    }

    /// Insert a row directly, bypassing the client API
    pub fn seed(&self, base_id: &str, table_name: &str, fields: Fields) -> Record {
        let record = Record::new(self.allocate_id(), fields, now());
        self.write_table(base_id, table_name, |rows| rows.push(record.clone()));
        record
    }

    /// Snapshot of a table's rows
    pub fn records(&self, base_id: &str, table_name: &str) -> Vec<Record> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables
            .get(&key(base_id, table_name))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of client calls served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(atomic::Ordering::SeqCst)
    }

    fn allocate_id(&self) -> String {
        let n = self.next_id.fetch_add(1, atomic::Ordering::SeqCst);
        format!("rec{:014}", n)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, atomic::Ordering::SeqCst);
    }

    fn read_table(&self, config: &Config) -> Vec<Record> {
        self.records(&config.base_id, &config.table_name)
    }

    fn write_table<T, F>(&self, base_id: &str, table_name: &str, f: F) -> T
    where
        F: FnOnce(&mut Vec<Record>) -> T,
    {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let rows = tables.entry(key(base_id, table_name)).or_default();
        f(rows)
    }

    fn modify(
        &self,
        config: &Config,
        id: &str,
        f: impl FnOnce(&mut Record),
    ) -> AirtableResult<Record> {
        self.write_table(&config.base_id, &config.table_name, |rows| {
            let row = rows.iter_mut().find(|r| r.id == id).ok_or_else(|| not_found(id))?;
            f(row);
            Ok(row.clone())
        })
    }
}

#[async_trait]
impl TableClient for MemoryTableClient {
    async fn list_page(
        &self,
        config: &Config,
        params: &ReadParams,
        offset: Option<&str>,
    ) -> AirtableResult<Page> {
        config.validate()?;
        params.validate()?;
        self.record_call();

        let condition = match &params.filter_by_formula {
            Some(formula) => Condition::parse(formula)?,
            None => Condition::All,
        };

        let mut rows: Vec<Record> = self
            .read_table(config)
            .into_iter()
            .filter(|r| condition.matches(&r.fields))
            .collect();
        apply_sort(&mut rows, &params.sort);
        if let Some(max) = params.max_records {
            rows.truncate(max as usize);
        }

        let start = match offset {
            None => 0,
            Some(cursor) => cursor
                .parse::<usize>()
                .ok()
                .filter(|&i| i <= rows.len())
                .ok_or_else(|| AirtableError::Api {
                    status: 422,
                    error_type: "LIST_RECORDS_ITERATOR_NOT_AVAILABLE".to_string(),
                    message: format!("Unknown offset '{}'", cursor),
                })?,
        };
        let size = params.page_size.map(|s| s as usize).unwrap_or(self.page_size);
        let end = (start + size).min(rows.len());

        let records = rows[start..end]
            .iter()
            .cloned()
            .map(|r| select_fields(r, &params.fields))
            .collect();
        let offset = (end < rows.len()).then(|| end.to_string());

        Ok(Page { records, offset })
    }

    async fn get(&self, config: &Config, id: &str) -> AirtableResult<Record> {
        config.validate()?;
        self.record_call();
        self.read_table(config)
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found(id))
    }

    async fn create(&self, config: &Config, fields: &Fields) -> AirtableResult<Record> {
        config.validate()?;
        self.record_call();
        Ok(self.seed(&config.base_id, &config.table_name, without_nulls(fields)))
    }

    async fn update(&self, config: &Config, id: &str, fields: &Fields) -> AirtableResult<Record> {
        config.validate()?;
        self.record_call();
        self.modify(config, id, |row| {
            for (k, v) in fields {
                if v.is_null() {
                    row.fields.remove(k);
                } else {
                    row.fields.insert(k.clone(), v.clone());
                }
            }
        })
    }

    async fn replace(
        &self,
        config: &Config,
        id: &str,
        fields: &Fields,
    ) -> AirtableResult<Record> {
        config.validate()?;
        self.record_call();
        self.modify(config, id, |row| row.fields = without_nulls(fields))
    }

    async fn destroy(&self, config: &Config, id: &str) -> AirtableResult<DeletedRecord> {
        config.validate()?;
        self.record_call();
        self.write_table(&config.base_id, &config.table_name, |rows| {
            let index = rows
                .iter()
                .position(|r| r.id == id)
                .ok_or_else(|| not_found(id))?;
            rows.remove(index);
            Ok(DeletedRecord {
                id: id.to_string(),
                deleted: true,
            })
        })
    }
}

fn key(base_id: &str, table_name: &str) -> TableKey {
    (base_id.to_string(), table_name.to_string())
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn not_found(id: &str) -> AirtableError {
    AirtableError::Api {
        status: 404,
        error_type: "NOT_FOUND".to_string(),
        message: format!("Could not find record {}", id),
    }
}

/// The service drops empty cells
fn without_nulls(fields: &Fields) -> Fields {
    fields
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn select_fields(mut record: Record, fields: &[String]) -> Record {
    if !fields.is_empty() {
        record.fields.retain(|k, _| fields.contains(k));
    }
    record
}

fn apply_sort(rows: &mut [Record], sort: &[SortField]) {
    if sort.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        for clause in sort {
            let cmp = compare_json_values(a.get(&clause.field), b.get(&clause.field));
            let cmp = match clause.direction {
                Direction::Asc => cmp,
                Direction::Desc => cmp.reverse(),
            };
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    });
}

/// Empty cells sort first, as they do in the service
fn compare_json_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&b.as_f64().unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Parsed `filterByFormula`
#[derive(Debug, Clone, PartialEq)]
enum Condition {
    All,
    Equals { column: String, literal: Literal },
}

#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Text(String),
    Number(f64),
    Bool(bool),
    Blank,
}

impl Condition {
    /// Accepts `Column = literal` and `{Multi Word} = literal`
    fn parse(formula: &str) -> AirtableResult<Self> {
        let formula = formula.trim();
        if formula.is_empty() {
            return Ok(Condition::All);
        }

        let invalid = || AirtableError::Api {
            status: 422,
            error_type: "INVALID_FILTER_BY_FORMULA".to_string(),
            message: format!("Unsupported formula: {}", formula),
        };

        let (column, rest) = if let Some(stripped) = formula.strip_prefix('{') {
            let close = stripped.find('}').ok_or_else(invalid)?;
            (&stripped[..close], &stripped[close + 1..])
        } else {
            let end = formula
                .find(|c: char| c.is_whitespace() || c == '=')
                .ok_or_else(invalid)?;
            (&formula[..end], &formula[end..])
        };

        let rest = rest.trim_start().strip_prefix('=').ok_or_else(invalid)?.trim();
        let literal = Literal::parse(rest).ok_or_else(invalid)?;

        Ok(Condition::Equals {
            column: column.to_string(),
            literal,
        })
    }

    fn matches(&self, fields: &Fields) -> bool {
        match self {
            Condition::All => true,
            Condition::Equals { column, literal } => literal.matches(fields.get(column)),
        }
    }
}

impl Literal {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "TRUE()" => return Some(Literal::Bool(true)),
            "FALSE()" => return Some(Literal::Bool(false)),
            "BLANK()" => return Some(Literal::Blank),
            _ => {}
        }

        let mut chars = text.chars();
        match chars.next()? {
            quote @ ('\'' | '"') => {
                let mut out = String::new();
                let mut escaped = false;
                let mut closed = false;
                for c in chars.by_ref() {
                    if escaped {
                        out.push(c);
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == quote {
                        closed = true;
                        break;
                    } else {
                        out.push(c);
                    }
                }
                // Nothing may follow the closing quote
                (closed && chars.next().is_none()).then_some(Literal::Text(out))
            }
            _ => text.parse::<f64>().ok().map(Literal::Number),
        }
    }

    fn matches(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Literal::Blank, None | Some(Value::Null)) => true,
            (Literal::Blank, Some(Value::String(s))) => s.is_empty(),
            (Literal::Blank, _) => false,
            // Unchecked checkboxes are absent
            (Literal::Bool(false), None) => true,
            (Literal::Bool(b), Some(Value::Bool(v))) => b == v,
            (Literal::Text(t), Some(Value::String(s))) => t == s,
            (Literal::Text(t), Some(Value::Number(n))) => {
                t.parse::<f64>().ok() == n.as_f64()
            }
            (Literal::Number(x), Some(Value::Number(n))) => n.as_f64() == Some(*x),
            (Literal::Number(x), Some(Value::String(s))) => s.parse::<f64>().ok() == Some(*x),
            _ => false,
        }
    }
}
