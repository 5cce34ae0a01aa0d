//! Metric stage — pattern-based discovery of quantitative values
//!
//! Scans page text with a fixed list of keyword-anchored patterns, then picks
//! up purely numeric table cells. The result is capped, never deduplicated:
//! repeated mentions of the same figure count as separate discoveries.

use super::Stage;
use crate::pipeline::PipelineError;
use crate::state::{DocumentState, Metric};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Keyword-anchored metric patterns, applied in this order on every page.
static METRIC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(?:revenue|sales|turnover)[\s:]*\$?\d+(?:,\d+)*(?:\.\d+)?",
        r"(?i)(?:profit|earnings|ebitda)[\s:]*\$?\d+(?:,\d+)*(?:\.\d+)?",
        r"(?i)(?:margin|rate)[\s:]*\d+(?:,\d+)*\.?\d*\s*%",
        r"(?i)(?:growth|increase)[\s:]*\d+(?:,\d+)*\.?\d*\s*%",
        r"(?i)(?:capacity|production)[\s:]*\d+(?:,\d+)*(?:\.\d+)?",
        r"(?i)(?:market share|penetration)[\s:]*\d+(?:,\d+)*\.?\d*\s*%",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid metric pattern"))
    .collect()
});

static NUMERIC_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("valid numeric cell regex"));

/// Whether a table cell holds a bare number (optionally with a decimal part).
pub(crate) fn is_numeric_cell(content: &str) -> bool {
    NUMERIC_CELL.is_match(content.trim())
}

#[derive(Debug)]
pub struct MetricStage {
    max_metrics: usize,
    context_window: usize,
}

impl Default for MetricStage {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricStage {
    pub fn new() -> Self {
        Self {
            max_metrics: 50,
            context_window: 50,
        }
    }

    pub fn with_max_metrics(mut self, max: usize) -> Self {
        self.max_metrics = max;
        self
    }

    pub fn with_context_window(mut self, chars: usize) -> Self {
        self.context_window = chars;
        self
    }
}

/// Text from `window` chars before `start` to `window` chars after `end`.
fn context_around(text: &str, start: usize, end: usize, window: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(window)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let to = text[end..]
        .char_indices()
        .nth(window)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());
    &text[from..to]
}

fn unit_of(value: &str) -> &'static str {
    if value.ends_with('%') {
        "%"
    } else if value.contains('$') {
        "$"
    } else {
        ""
    }
}

impl Stage for MetricStage {
    fn id(&self) -> &str {
        "metrics"
    }

    fn name(&self) -> &str {
        "Metric Discovery"
    }

    fn apply(&self, mut state: DocumentState) -> Result<DocumentState, PipelineError> {
        let mut metrics = Vec::new();

        for page in &state.pages {
            let text = page.text.as_str();
            for pattern in METRIC_PATTERNS.iter() {
                for m in pattern.find_iter(text) {
                    let value = m.as_str().trim();
                    let name = value
                        .split(|c: char| c.is_whitespace() || c == ':')
                        .next()
                        .unwrap_or_default();
                    let context = context_around(text, m.start(), m.end(), self.context_window);

                    metrics.push(Metric {
                        name: name.to_string(),
                        value: value.to_string(),
                        unit: unit_of(value).to_string(),
                        page_number: page.page_number,
                        context: context.trim().to_string(),
                    });
                }
            }
        }

        let text_hits = metrics.len();

        for table in &state.tables {
            for (row, col, content) in table.cells() {
                if is_numeric_cell(content) {
                    metrics.push(Metric {
                        name: format!("table_value_{}", metrics.len()),
                        value: content.trim().to_string(),
                        unit: String::new(),
                        page_number: table.page_number(),
                        context: format!("Table cell [{}, {}]", row, col),
                    });
                }
            }
        }

        debug!(
            text_hits,
            table_hits = metrics.len() - text_hits,
            "metric candidates before cap"
        );
        metrics.truncate(self.max_metrics);
        state.metrics = metrics;

        info!(metrics = state.metrics.len(), "discovered metrics");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Page, RawCell, RawTable};

    fn discover(text: &str) -> Vec<Metric> {
        MetricStage::new()
            .apply(DocumentState::from_pages(vec![Page::new(1, text)]))
            .unwrap()
            .metrics
    }

    #[test]
    fn finds_revenue_and_growth() {
        let metrics = discover("REVENUE\nRevenue: $5,000,000\nGrowth: 12%");

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].name, "Revenue");
        assert_eq!(metrics[0].value, "Revenue: $5,000,000");
        assert_eq!(metrics[0].unit, "$");
        assert_eq!(metrics[1].name, "Growth");
        assert_eq!(metrics[1].value, "Growth: 12%");
        assert_eq!(metrics[1].unit, "%");
    }

    #[test]
    fn percentage_patterns_require_percent_sign() {
        assert!(discover("margin 45").is_empty());
        let metrics = discover("operating margin 45.5 %");
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].value, "margin 45.5 %");
    }

    #[test]
    fn discovery_is_pattern_major_within_a_page() {
        // growth appears first in the text but its pattern runs after profit
        let metrics = discover("growth 5% then profit 300");
        assert_eq!(metrics[0].name, "profit");
        assert_eq!(metrics[1].name, "growth");
    }

    #[test]
    fn duplicates_are_not_merged() {
        let metrics = discover("sales 10 and sales 10");
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].value, metrics[1].value);
    }

    #[test]
    fn context_is_clipped_to_window() {
        let prefix = "x".repeat(80);
        let suffix = "y".repeat(80);
        let text = format!("{} revenue 42 {}", prefix, suffix);
        let metrics = discover(&text);

        let context = &metrics[0].context;
        assert!(context.contains("revenue 42"));
        // 50 chars either side of a 10-char match, trimmed
        assert!(context.chars().count() <= 110);
        assert!(context.starts_with('x'));
        assert!(context.ends_with('y'));
    }

    #[test]
    fn context_handles_multibyte_text() {
        let metrics = discover("€€€ revenue 7 ééé");
        assert_eq!(metrics[0].context, "€€€ revenue 7 ééé");
    }

    #[test]
    fn numeric_table_cells_become_metrics() {
        let state = DocumentState::new(
            "",
            vec![Page::new(1, "turnover 12")],
            vec![RawTable {
                page_number: 4,
                row_count: 2,
                column_count: 2,
                cells: vec![
                    RawCell::new(0, 0, "Year"),
                    RawCell::new(0, 1, "Units"),
                    RawCell::new(1, 0, "2023"),
                    RawCell::new(1, 1, "12.5"),
                    RawCell::new(1, 2, "12abc"),
                ],
            }],
        );

        let metrics = MetricStage::new().apply(state).unwrap().metrics;
        assert_eq!(metrics.len(), 3);
        assert_eq!(metrics[1].name, "table_value_1");
        assert_eq!(metrics[1].value, "2023");
        assert_eq!(metrics[1].context, "Table cell [1, 0]");
        assert_eq!(metrics[1].page_number, 4);
        assert_eq!(metrics[2].name, "table_value_2");
    }

    #[test]
    fn caps_discoveries() {
        let text = "sales 1 ".repeat(80);
        assert_eq!(discover(&text).len(), 50);

        let capped = MetricStage::new()
            .with_max_metrics(5)
            .apply(DocumentState::from_pages(vec![Page::new(1, text)]))
            .unwrap();
        assert_eq!(capped.metrics.len(), 5);
    }

    #[test]
    fn numeric_cell_detection() {
        assert!(is_numeric_cell("42"));
        assert!(is_numeric_cell(" 3.14 "));
        assert!(!is_numeric_cell("3."));
        assert!(!is_numeric_cell("1,000"));
        assert!(!is_numeric_cell(""));
    }
}
