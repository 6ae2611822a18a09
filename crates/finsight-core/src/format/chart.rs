//! Chart payload construction and shape inference
//!
//! The directive's explicit chart shape is the highest-priority signal. When
//! absent, the shape is inferred: first from intent keywords in the
//! explanation text (a best-effort UX nicety, not a source of truth), then
//! from the structure of the data, falling back to a bar chart.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chart rendering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
    Donut,
}

/// Legend/series entry: display label plus resolved color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeriesConfig {
    pub label: String,
    pub color: String,
}

/// A renderable chart: rows, per-series/slice config, and key metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload {
    pub chart_type: ChartKind,
    pub data: Vec<Value>,
    pub config: BTreeMap<String, ChartSeriesConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_key: Option<String>,
}

/// Rotating palette for bar/line series
const SERIES_PALETTE: [&str; 5] = ["#2563eb", "#16a34a", "#ea580c", "#9333ea", "#0891b2"];

/// Rotating palette for pie/donut slices
const SLICE_PALETTE: [&str; 12] = [
    "#2563eb", "#16a34a", "#ea580c", "#9333ea", "#0891b2", "#dc2626", "#ca8a04", "#db2777",
    "#65a30d", "#7c3aed", "#0d9488", "#f59e0b",
];

/// Explanation keywords that signal a proportional chart
const PIE_KEYWORDS: [&str; 7] = [
    "pie",
    "donut",
    "circular",
    "proportion",
    "percentage",
    "breakdown",
    "distribution",
];

/// Pick a chart shape for the rows
///
/// Priority: explicit hint, then intent keywords in the explanation, then
/// the shape of the data, then bar.
pub fn infer_chart_kind(rows: &[Value], hint: Option<ChartKind>, explanation: &str) -> ChartKind {
    if let Some(kind) = hint {
        return kind;
    }

    let lower = explanation.to_lowercase();
    if PIE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return ChartKind::Pie;
    }

    if looks_like_category_summary(rows) {
        return ChartKind::Pie;
    }

    ChartKind::Bar
}

/// Grouped-by-category summaries - a label key and a magnitude key with no
/// date dimension - render naturally as proportions.
fn looks_like_category_summary(rows: &[Value]) -> bool {
    !rows.is_empty()
        && rows.iter().all(|row| match row {
            Value::Object(map) => {
                (map.contains_key("category") || map.contains_key("type"))
                    && !map.contains_key("date")
                    && (map.contains_key("total") || map.contains_key("value"))
            }
            _ => false,
        })
}

/// Build the payload for a chosen shape
///
/// Callers guarantee `rows` is non-empty; missing keys degrade to defaults
/// rather than erroring.
pub fn build_chart(rows: &[Value], kind: ChartKind) -> ChartPayload {
    match kind {
        ChartKind::Line => build_line(rows),
        ChartKind::Bar => build_bar(rows),
        ChartKind::Pie | ChartKind::Donut => build_slices(rows, kind),
    }
}

fn first_present_key(row: &Value, candidates: &[&str], fallback: &str) -> String {
    if let Value::Object(map) = row {
        for candidate in candidates {
            if map.contains_key(*candidate) {
                return candidate.to_string();
            }
        }
    }
    fallback.to_string()
}

/// Display label for a data key
fn label_for(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn build_line(rows: &[Value]) -> ChartPayload {
    let x_key = "date".to_string();
    let y_key = "total".to_string();

    // Coerce the y value to a number so the client never sees a non-numeric point
    let data = rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            if let Value::Object(ref mut map) = row {
                let coerced = map.get(&y_key).and_then(Value::as_f64).unwrap_or(0.0);
                map.insert(y_key.clone(), coerced.into());
            }
            row
        })
        .collect();

    let mut config = BTreeMap::new();
    config.insert(
        y_key.clone(),
        ChartSeriesConfig {
            label: label_for(&y_key),
            color: SERIES_PALETTE[0].to_string(),
        },
    );

    ChartPayload {
        chart_type: ChartKind::Line,
        data,
        config,
        x_axis_key: Some(x_key),
        y_axis_key: Some(y_key),
        name_key: None,
        data_key: None,
    }
}

fn build_bar(rows: &[Value]) -> ChartPayload {
    let x_key = first_present_key(&rows[0], &["date", "name", "category", "type"], "name");

    // Every other numeric key of the first row becomes a series
    let mut y_keys: Vec<String> = Vec::new();
    if let Value::Object(map) = &rows[0] {
        for (key, value) in map {
            if key != &x_key && value.is_number() {
                y_keys.push(key.clone());
            }
        }
    }
    if y_keys.is_empty() {
        y_keys.push("value".to_string());
    }

    let mut config = BTreeMap::new();
    for (i, key) in y_keys.iter().enumerate() {
        config.insert(
            key.clone(),
            ChartSeriesConfig {
                label: label_for(key),
                color: SERIES_PALETTE[i % SERIES_PALETTE.len()].to_string(),
            },
        );
    }

    ChartPayload {
        chart_type: ChartKind::Bar,
        data: rows.to_vec(),
        config,
        x_axis_key: Some(x_key),
        y_axis_key: Some(y_keys[0].clone()),
        name_key: None,
        data_key: None,
    }
}

fn build_slices(rows: &[Value], kind: ChartKind) -> ChartPayload {
    let name_key = first_present_key(&rows[0], &["name", "category", "type"], "name");
    let data_key = first_present_key(&rows[0], &["value", "total", "amount"], "value");

    let mut config = BTreeMap::new();
    let data = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut row = row.clone();
            if let Value::Object(ref mut map) = row {
                // A row's own color wins; the palette fills the rest by index
                let color = map
                    .get("color")
                    .or_else(|| map.get("fill"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| SLICE_PALETTE[i % SLICE_PALETTE.len()].to_string());

                map.insert("fill".to_string(), color.clone().into());

                let slice_name = map
                    .get(&name_key)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Slice {}", i + 1));
                config.entry(slice_name.clone()).or_insert(ChartSeriesConfig {
                    label: slice_name,
                    color,
                });
            }
            row
        })
        .collect();

    ChartPayload {
        chart_type: kind,
        data,
        config,
        x_axis_key: None,
        y_axis_key: None,
        name_key: Some(name_key),
        data_key: Some(data_key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn category_rows() -> Vec<Value> {
        vec![
            json!({"category": "Food", "total": 500.0}),
            json!({"category": "Rent", "total": 1200.0}),
        ]
    }

    #[test]
    fn test_hint_wins_over_everything() {
        let kind = infer_chart_kind(&category_rows(), Some(ChartKind::Donut), "pie breakdown");
        assert_eq!(kind, ChartKind::Donut);
    }

    #[test]
    fn test_keyword_detection_is_case_insensitive() {
        let rows = vec![json!({"date": "2024-03-01", "total": 10.0})];
        assert_eq!(
            infer_chart_kind(&rows, None, "Show me the Distribution of spending"),
            ChartKind::Pie
        );
    }

    #[test]
    fn test_structural_detection_requires_no_date_key() {
        assert_eq!(infer_chart_kind(&category_rows(), None, ""), ChartKind::Pie);

        let dated = vec![json!({"category": "Food", "date": "2024-03-01", "total": 10.0})];
        assert_eq!(infer_chart_kind(&dated, None, ""), ChartKind::Bar);
    }

    #[test]
    fn test_line_coerces_non_numeric_totals() {
        let rows = vec![
            json!({"date": "2024-03-01", "total": "not a number"}),
            json!({"date": "2024-03-02", "total": 25.0}),
        ];
        let chart = build_line(&rows);
        assert_eq!(chart.data[0]["total"], 0.0);
        assert_eq!(chart.data[1]["total"], 25.0);
        assert_eq!(chart.x_axis_key.as_deref(), Some("date"));
        assert_eq!(chart.y_axis_key.as_deref(), Some("total"));
    }

    #[test]
    fn test_bar_picks_x_key_and_numeric_series() {
        let rows = vec![json!({"type": "CREDIT", "count": 2, "total": 75450.0, "note": "x"})];
        let chart = build_bar(&rows);
        assert_eq!(chart.x_axis_key.as_deref(), Some("type"));
        // Both numeric keys become series with distinct palette colors
        assert_eq!(chart.config.len(), 2);
        let colors: Vec<&str> = chart.config.values().map(|c| c.color.as_str()).collect();
        assert_ne!(colors[0], colors[1]);
        assert!(chart.config.contains_key("count"));
        assert!(chart.config.contains_key("total"));
    }

    #[test]
    fn test_bar_with_no_numeric_keys_defaults_value() {
        let rows = vec![json!({"name": "A"})];
        let chart = build_bar(&rows);
        assert_eq!(chart.y_axis_key.as_deref(), Some("value"));
        assert!(chart.config.contains_key("value"));
    }

    #[test]
    fn test_slices_get_palette_colors_and_config() {
        let chart = build_slices(&category_rows(), ChartKind::Pie);
        assert_eq!(chart.name_key.as_deref(), Some("category"));
        assert_eq!(chart.data_key.as_deref(), Some("total"));
        assert_eq!(chart.data[0]["fill"], SLICE_PALETTE[0]);
        assert_eq!(chart.data[1]["fill"], SLICE_PALETTE[1]);
        assert_eq!(chart.config["Food"].color, SLICE_PALETTE[0]);
        assert_eq!(chart.config["Rent"].color, SLICE_PALETTE[1]);
    }

    #[test]
    fn test_slice_row_color_overrides_palette() {
        let rows = vec![
            json!({"category": "Food", "total": 500.0, "color": "#123456"}),
            json!({"category": "Rent", "total": 1200.0}),
        ];
        let chart = build_slices(&rows, ChartKind::Donut);
        assert_eq!(chart.chart_type, ChartKind::Donut);
        assert_eq!(chart.data[0]["fill"], "#123456");
        assert_eq!(chart.config["Food"].color, "#123456");
        assert_eq!(chart.config["Rent"].color, SLICE_PALETTE[1]);
    }
}
