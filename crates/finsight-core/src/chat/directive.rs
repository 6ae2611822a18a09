//! Query directive extraction from model responses
//!
//! The model is prompted to embed a single JSON directive in its reply,
//! usually inside a fenced code block but often with extra prose around it.
//! These helpers locate and parse that directive; a reply without one is a
//! plain text turn, not an error.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::format::{ChartKind, PresentationType};
use crate::query::{Aggregation, GroupBy, QueryDescriptor, QueryFilters};

/// The structured directive embedded in a model response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDirective {
    /// Desired presentation of the answer
    pub query_type: PresentationType,
    /// One of the six queryable record kinds (validated by the executor)
    pub entity: String,
    #[serde(default)]
    pub filters: QueryFilters,
    #[serde(default)]
    pub aggregation: Option<Aggregation>,
    #[serde(default)]
    pub group_by: Option<GroupBy>,
    /// Explicit chart shape, if the model chose one
    #[serde(default)]
    pub chart_type: Option<ChartKind>,
    /// Natural-language explanation shown to the user
    #[serde(default)]
    pub explanation: String,
}

impl QueryDirective {
    /// The query half of the directive, for the executor
    pub fn descriptor(&self) -> QueryDescriptor {
        QueryDescriptor {
            entity: self.entity.clone(),
            filters: self.filters.clone(),
            aggregation: self.aggregation,
            group_by: self.group_by,
        }
    }
}

/// Extract a query directive from free-form model output
///
/// Candidates are fenced code blocks first, then the first brace-matched
/// bare object. Only JSON containing the literal key `"queryType"` is
/// considered; anything else (or nothing) means a plain text turn.
pub fn extract_directive(response: &str) -> Option<QueryDirective> {
    for candidate in json_candidates(response) {
        if !candidate.contains("\"queryType\"") {
            continue;
        }
        match serde_json::from_str::<QueryDirective>(&candidate) {
            Ok(directive) => return Some(directive),
            Err(e) => {
                debug!(error = %e, "Skipping unparseable directive candidate");
            }
        }
    }
    None
}

fn json_candidates(response: &str) -> Vec<String> {
    let mut candidates = Vec::new();

    let fence_re = Regex::new(r"```[a-zA-Z]*\s*([\s\S]*?)```").expect("valid regex");
    for cap in fence_re.captures_iter(response) {
        candidates.push(cap[1].trim().to_string());
    }

    if let Some(object) = first_json_object(response) {
        candidates.push(object.to_string());
    }

    candidates
}

/// Find the first balanced `{...}` span, ignoring braces inside strings
fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_fenced_block() {
        let response = r#"Here is your spending summary.

```json
{
  "queryType": "CHART",
  "entity": "transaction",
  "filters": {"dateFrom": "2024-03-01"},
  "aggregation": null,
  "groupBy": "category",
  "chartType": "pie",
  "explanation": "Spending breakdown by category"
}
```
Let me know if you need more detail."#;

        let directive = extract_directive(response).unwrap();
        assert_eq!(directive.query_type, PresentationType::Chart);
        assert_eq!(directive.entity, "transaction");
        assert_eq!(directive.filters.date_from.as_deref(), Some("2024-03-01"));
        assert_eq!(directive.group_by, Some(GroupBy::Category));
        assert_eq!(directive.chart_type, Some(ChartKind::Pie));
    }

    #[test]
    fn test_extract_bare_json() {
        let response = r#"Sure! {"queryType": "TEXT", "entity": "goal", "aggregation": "count", "explanation": "Number of goals"} done."#;
        let directive = extract_directive(response).unwrap();
        assert_eq!(directive.query_type, PresentationType::Text);
        assert_eq!(directive.aggregation, Some(Aggregation::Count));
        assert_eq!(directive.group_by, None);
    }

    #[test]
    fn test_no_directive_means_text_turn() {
        assert!(extract_directive("Hello! How can I help with your finances today?").is_none());
    }

    #[test]
    fn test_json_without_query_type_is_ignored() {
        let response = r#"{"entity": "transaction", "note": "missing the tag key"}"#;
        assert!(extract_directive(response).is_none());
    }

    #[test]
    fn test_braces_inside_strings_do_not_break_matching() {
        let response = r#"{"queryType": "TEXT", "entity": "transaction", "explanation": "curly {braces} inside"}"#;
        let directive = extract_directive(response).unwrap();
        assert_eq!(directive.explanation, "curly {braces} inside");
    }

    #[test]
    fn test_unknown_aggregation_rejects_candidate() {
        let response = r#"{"queryType": "TEXT", "entity": "transaction", "aggregation": "median", "explanation": "x"}"#;
        assert!(extract_directive(response).is_none());
    }

    #[test]
    fn test_unfenced_block_language_tag() {
        let response = "```\n{\"queryType\": \"TABLE\", \"entity\": \"investment\", \"explanation\": \"All investments\"}\n```";
        let directive = extract_directive(response).unwrap();
        assert_eq!(directive.query_type, PresentationType::Table);
        assert_eq!(directive.entity, "investment");
    }
}
