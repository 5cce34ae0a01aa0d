//! Footnote stage — marker extraction and metric cross-linking
//!
//! Three independent pattern families run over every page: bracketed numbers
//! (`[1] ...`), asterisk markers (`* ...`), and numbered-list lines
//! (`1. ...`). A line can be picked up by more than one family.

use super::Stage;
use crate::pipeline::PipelineError;
use crate::state::{DocumentState, Footnote, Metric};
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

static FOOTNOTE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"\[\d+\][^\[\n]*").expect("valid bracket footnote regex"),
        Regex::new(r"\*+[^*\n]*").expect("valid asterisk footnote regex"),
        Regex::new(r"(?m)^\d+\.\s+.+$").expect("valid numbered footnote regex"),
    ]
});

/// Leading digit group, optionally behind `[` or a run of asterisks.
static REFERENCE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\[|\*+)?(\d+)").expect("valid reference id regex"));

#[derive(Debug)]
pub struct FootnoteStage {
    max_footnotes: usize,
}

impl Default for FootnoteStage {
    fn default() -> Self {
        Self::new()
    }
}

impl FootnoteStage {
    pub fn new() -> Self {
        Self { max_footnotes: 50 }
    }

    pub fn with_max_footnotes(mut self, max: usize) -> Self {
        self.max_footnotes = max;
        self
    }
}

/// Digit group from the marker, or `ref_<running count>`.
///
/// The synthetic form restarts from whatever the count is when it is needed,
/// so it can collide with an explicit id elsewhere in the document.
fn reference_id(content: &str, running_count: usize) -> String {
    REFERENCE_ID
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| format!("ref_{}", running_count))
}

/// Names of metrics whose context mentions the footnote text.
fn linked_metrics(content: &str, metrics: &[Metric]) -> Vec<String> {
    let needle = content.to_lowercase();
    metrics
        .iter()
        .filter(|m| m.context.to_lowercase().contains(&needle))
        .map(|m| m.name.clone())
        .collect()
}

impl Stage for FootnoteStage {
    fn id(&self) -> &str {
        "footnotes"
    }

    fn name(&self) -> &str {
        "Footnote Linking"
    }

    fn apply(&self, mut state: DocumentState) -> Result<DocumentState, PipelineError> {
        let mut footnotes: Vec<Footnote> = Vec::new();

        'pages: for page in &state.pages {
            for pattern in FOOTNOTE_PATTERNS.iter() {
                for m in pattern.find_iter(&page.text) {
                    // Anything past the cap would be truncated anyway.
                    if footnotes.len() >= self.max_footnotes {
                        break 'pages;
                    }
                    let content = m.as_str().trim();
                    footnotes.push(Footnote {
                        reference_id: reference_id(content, footnotes.len()),
                        page_number: page.page_number,
                        content: content.to_string(),
                        linked_metrics: linked_metrics(content, &state.metrics),
                    });
                }
            }
        }

        let linked = footnotes
            .iter()
            .filter(|f| !f.linked_metrics.is_empty())
            .count();
        state.footnotes = footnotes;

        info!(footnotes = state.footnotes.len(), linked, "extracted footnotes");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Page;

    fn extract(text: &str) -> Vec<Footnote> {
        FootnoteStage::new()
            .apply(DocumentState::from_pages(vec![Page::new(1, text)]))
            .unwrap()
            .footnotes
    }

    #[test]
    fn bracketed_reference_uses_its_number() {
        let notes = extract("Net sales rose.\n[3] Excludes discontinued operations");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].reference_id, "3");
        assert_eq!(notes[0].content, "[3] Excludes discontinued operations");
    }

    #[test]
    fn asterisk_markers_without_digits_get_synthetic_ids() {
        let notes = extract("Total * Unaudited figures");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "* Unaudited figures");
        assert_eq!(notes[0].reference_id, "ref_0");
    }

    #[test]
    fn asterisk_with_digits_uses_digits() {
        let notes = extract("**2 Restated");
        assert_eq!(notes[0].reference_id, "2");
    }

    #[test]
    fn only_a_leading_marker_supplies_the_id() {
        let notes = extract("Margin *see note [5]");
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].content, "[5]");
        assert_eq!(notes[0].reference_id, "5");
        assert_eq!(notes[1].content, "*see note [5]");
        assert_eq!(notes[1].reference_id, "ref_1");
    }

    #[test]
    fn numbered_lines_are_candidates() {
        let notes = extract("Notes\n1. Figures in USD\n2. Rounded to nearest thousand");
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].reference_id, "1");
        assert_eq!(notes[1].content, "2. Rounded to nearest thousand");
    }

    #[test]
    fn families_run_independently_and_ids_may_repeat() {
        // synthetic ids follow the running count
        let notes = extract("* first note\n* second note");
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].reference_id, "ref_0");
        assert_eq!(notes[1].reference_id, "ref_1");

        let across_pages = FootnoteStage::new()
            .apply(DocumentState::from_pages(vec![
                Page::new(1, "[7] page one note"),
                Page::new(2, "[7] page two note"),
            ]))
            .unwrap()
            .footnotes;
        assert_eq!(across_pages[0].reference_id, across_pages[1].reference_id);
        assert_eq!(across_pages[1].page_number, 2);
    }

    #[test]
    fn links_metrics_whose_context_contains_the_note() {
        let mut state = DocumentState::from_pages(vec![Page::new(
            1,
            "Revenue 500 [1] restated",
        )]);
        state.metrics = vec![
            Metric {
                name: "Revenue".into(),
                value: "Revenue 500".into(),
                unit: String::new(),
                page_number: 1,
                context: "Revenue 500 [1] RESTATED".into(),
            },
            Metric {
                name: "profit".into(),
                value: "profit 3".into(),
                unit: String::new(),
                page_number: 1,
                context: "profit 3 elsewhere".into(),
            },
        ];

        let notes = FootnoteStage::new().apply(state).unwrap().footnotes;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].linked_metrics, vec!["Revenue".to_string()]);
    }

    #[test]
    fn caps_footnotes_across_document() {
        let page = "[1] note\n".repeat(30);
        let state = DocumentState::from_pages(vec![
            Page::new(1, page.clone()),
            Page::new(2, page),
        ]);
        let notes = FootnoteStage::new().apply(state).unwrap().footnotes;
        assert_eq!(notes.len(), 50);
        assert_eq!(notes[49].page_number, 2);
    }

    #[test]
    fn no_pages_no_footnotes() {
        assert!(extract("").is_empty());
        assert!(FootnoteStage::new()
            .apply(DocumentState::default())
            .unwrap()
            .footnotes
            .is_empty());
    }
}
