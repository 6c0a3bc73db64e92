//! # Formula helpers
//!
//! Builds the small subset of formula text the façade needs for
//! key-based lookups.

use serde_json::Value;

/// Wrap a column name in braces when it contains whitespace.
///
/// Single-word names pass through unchanged. Names already wrapped in
/// braces are left alone.
pub fn format_column_filter(column: &str) -> String {
    let already_braced = column.starts_with('{') && column.ends_with('}');
    if !already_braced && column.contains(char::is_whitespace) {
        format!("{{{}}}", column)
    } else {
        column.to_string()
    }
}

/// Render a JSON value as a formula literal
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "BLANK()".to_string(),
        Value::Bool(true) => "TRUE()".to_string(),
        Value::Bool(false) => "FALSE()".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        // Arrays and objects compare by their JSON text
        other => quote(&other.to_string()),
    }
}

/// `<column> = <literal>`
pub fn equals(column: &str, value: &Value) -> String {
    format!("{} = {}", format_column_filter(column), literal(value))
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
