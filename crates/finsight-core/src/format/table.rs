//! Table payload construction
//!
//! Flattens query output into ordered columns and pre-stringified cells so
//! the client renders rows without any type-sniffing of its own.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::currency::format_inr;
use crate::query::QueryResult;

/// A rendered table: ordered column names plus string-valued rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePayload {
    pub columns: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

/// Column names that render as currency (substring match, case-insensitive)
const CURRENCY_COLUMN_HINTS: [&str; 4] = ["amount", "value", "price", "total"];

/// Keys excluded from tables: internal fields and chart color plumbing
fn is_hidden_key(key: &str) -> bool {
    key.starts_with('_') || key == "fill"
}

fn is_currency_column(column: &str) -> bool {
    let lower = column.to_lowercase();
    CURRENCY_COLUMN_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Build a table from query output
///
/// Scalars wrap into a single-row table; row lists keep one table row per
/// record with the column set being the union of keys across all rows in
/// first-appearance order.
pub fn build_table(data: &QueryResult) -> TablePayload {
    let rows = match data {
        QueryResult::Count(n) => vec![serde_json::json!({ "count": n })],
        QueryResult::Scalar(v) => vec![serde_json::json!({ "value": v })],
        QueryResult::Rows(rows) => rows.clone(),
    };

    let mut columns: Vec<String> = Vec::new();
    for row in &rows {
        if let Value::Object(map) = row {
            for key in map.keys() {
                if !is_hidden_key(key) && !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
    }

    let rendered = rows
        .iter()
        .map(|row| {
            let mut cells = BTreeMap::new();
            if let Value::Object(map) = row {
                for column in &columns {
                    let value = map.get(column).unwrap_or(&Value::Null);
                    cells.insert(column.clone(), format_cell(column, value));
                }
            }
            cells
        })
        .collect();

    TablePayload {
        columns,
        rows: rendered,
    }
}

/// Render one cell to its display string
fn format_cell(column: &str, value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => format_date_like(s).unwrap_or_else(|| s.clone()),
        Value::Number(n) => {
            if is_currency_column(column) {
                format_inr(n.as_f64())
            } else {
                n.to_string()
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => {
            // Never show a raw object: prefer a display name, then an id
            if let Some(Value::String(name)) = map.get("name") {
                name.clone()
            } else if let Some(id) = map.get("id") {
                id.to_string()
            } else {
                serde_json::to_string(map).unwrap_or_default()
            }
        }
        Value::Array(items) => serde_json::to_string(items).unwrap_or_default(),
    }
}

/// Render ISO dates and datetimes as a short display date
fn format_date_like(s: &str) -> Option<String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.format("%-d %b %Y").to_string());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
        return Some(datetime.format("%-d %b %Y").to_string());
    }
    None
}
