//! Response formatting for the chat assistant
//!
//! Turns query output plus the directive's presentation fields into a single
//! tagged payload (text, table, or chart) ready for transport. Formatting
//! never fails: incomplete or odd-shaped data degrades (chart falls back to
//! text, missing keys fall back to defaults) instead of erroring, so a chat
//! turn cannot break on presentation.

mod chart;
mod currency;
mod table;

pub use chart::{ChartKind, ChartPayload, ChartSeriesConfig};
pub use currency::format_inr;
pub use table::TablePayload;

use serde::{Deserialize, Serialize};

use crate::query::QueryResult;

/// Desired top-level shape of a formatted response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PresentationType {
    Text,
    Table,
    Chart,
}

/// A formatted chat response ready for transport
///
/// Serializes with a `responseType` tag and, for TABLE/CHART, the payload
/// under `table`/`chart`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "responseType")]
pub enum FormattedResponse {
    #[serde(rename = "TEXT")]
    Text { content: String },
    #[serde(rename = "TABLE")]
    Table { table: TablePayload },
    #[serde(rename = "CHART")]
    Chart { chart: ChartPayload },
}

impl FormattedResponse {
    pub fn response_type(&self) -> &'static str {
        match self {
            Self::Text { .. } => "TEXT",
            Self::Table { .. } => "TABLE",
            Self::Chart { .. } => "CHART",
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }
}

/// Format query output for presentation
///
/// `chart_hint` is the directive's explicit chart shape and wins when set;
/// otherwise the shape is inferred from the explanation text and the data
/// shape. A chart is only produced for a non-empty row list - anything else
/// degrades to text.
pub fn format_response(
    presentation: PresentationType,
    data: &QueryResult,
    chart_hint: Option<ChartKind>,
    explanation: &str,
) -> FormattedResponse {
    match presentation {
        PresentationType::Text => FormattedResponse::Text {
            content: text_content(explanation, data),
        },
        PresentationType::Table => FormattedResponse::Table {
            table: table::build_table(data),
        },
        PresentationType::Chart => match data.rows() {
            Some(rows) if !rows.is_empty() => {
                let kind = chart::infer_chart_kind(rows, chart_hint, explanation);
                FormattedResponse::Chart {
                    chart: chart::build_chart(rows, kind),
                }
            }
            _ => FormattedResponse::Text {
                content: if explanation.is_empty() {
                    "No data available for the requested chart.".to_string()
                } else {
                    explanation.to_string()
                },
            },
        },
    }
}

/// Explanation plus a rendering of the data - both pieces are always present
/// because downstream consumers read the number/rows out of the text content.
fn text_content(explanation: &str, data: &QueryResult) -> String {
    let rendered = match data {
        QueryResult::Count(n) => n.to_string(),
        QueryResult::Scalar(v) => currency::format_inr(Some(*v)),
        QueryResult::Rows(rows) => serde_json::to_string(rows).unwrap_or_default(),
    };
    if explanation.is_empty() {
        rendered
    } else {
        format!("{}\n\n{}", explanation, rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_includes_explanation_and_data() {
        let response = format_response(
            PresentationType::Text,
            &QueryResult::Scalar(53800.0),
            None,
            "Your total spending for March.",
        );
        let FormattedResponse::Text { content } = response else {
            panic!("expected text");
        };
        assert!(content.starts_with("Your total spending for March."));
        assert!(content.contains("₹53,800"));
    }

    #[test]
    fn test_text_renders_count_as_plain_integer() {
        let response =
            format_response(PresentationType::Text, &QueryResult::Count(6), None, "Six.");
        let FormattedResponse::Text { content } = response else {
            panic!("expected text");
        };
        assert!(content.ends_with("\n\n6"));
    }

    #[test]
    fn test_chart_with_empty_rows_degrades_to_text() {
        let response = format_response(
            PresentationType::Chart,
            &QueryResult::Rows(vec![]),
            Some(ChartKind::Bar),
            "explanation text",
        );
        assert_eq!(response, FormattedResponse::text("explanation text"));
    }

    #[test]
    fn test_chart_with_scalar_degrades_to_placeholder() {
        let response = format_response(
            PresentationType::Chart,
            &QueryResult::Scalar(10.0),
            None,
            "",
        );
        let FormattedResponse::Text { content } = response else {
            panic!("expected text");
        };
        assert_eq!(content, "No data available for the requested chart.");
    }

    #[test]
    fn test_pie_auto_detection_from_shape_and_keywords() {
        let data = QueryResult::Rows(vec![
            json!({"category": "Food", "total": 500.0}),
            json!({"category": "Rent", "total": 1200.0}),
        ]);
        let response = format_response(
            PresentationType::Chart,
            &data,
            None,
            "breakdown by category",
        );
        let FormattedResponse::Chart { chart } = response else {
            panic!("expected chart");
        };
        assert_eq!(chart.chart_type, ChartKind::Pie);
        assert_eq!(chart.name_key.as_deref(), Some("category"));
        assert_eq!(chart.data_key.as_deref(), Some("total"));
    }

    #[test]
    fn test_explicit_hint_beats_heuristics() {
        let data = QueryResult::Rows(vec![
            json!({"category": "Food", "total": 500.0}),
            json!({"category": "Rent", "total": 1200.0}),
        ]);
        let response = format_response(
            PresentationType::Chart,
            &data,
            Some(ChartKind::Line),
            "breakdown by category",
        );
        let FormattedResponse::Chart { chart } = response else {
            panic!("expected chart");
        };
        assert_eq!(chart.chart_type, ChartKind::Line);
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let data = QueryResult::Rows(vec![
            json!({"date": "2024-03-01", "count": 2, "total": 53000.0}),
            json!({"date": "2024-03-02", "count": 1, "total": -22000.0}),
        ]);
        let first = format_response(PresentationType::Chart, &data, None, "daily flow");
        let second = format_response(PresentationType::Chart, &data, None, "daily flow");
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_response_type_tag_serialization() {
        let response = FormattedResponse::text("hello");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["responseType"], "TEXT");
        assert_eq!(value["content"], "hello");
    }
}
