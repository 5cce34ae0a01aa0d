//! Document state threaded through the pipeline
//!
//! A `DocumentState` is created fresh for every document, enriched stage by
//! stage, and handed to the caller when the last stage finishes. It carries no
//! identity beyond the document it describes.

mod artifacts;
mod table;

pub use artifacts::{
    Domain, Footnote, Insight, InsightKind, IssueKind, Metric, Narrative, Page, Priority, Section,
    Sentiment, Severity, ValidationIssue,
};
pub use table::{
    NormalizedTable, RawCell, RawTable, TableArtifact, MAX_GRID_COLUMNS, MAX_GRID_ROWS,
};

use serde::{Deserialize, Serialize};

/// The single aggregate record for one document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentState {
    pub report_id: String,
    pub pages: Vec<Page>,
    pub sections: Vec<Section>,
    pub tables: Vec<TableArtifact>,
    pub domains: Vec<Domain>,
    pub metrics: Vec<Metric>,
    pub narratives: Vec<Narrative>,
    pub footnotes: Vec<Footnote>,
    pub validation_issues: Vec<ValidationIssue>,
    /// In `[0, 1]` once validation has run; `0.0` before.
    pub confidence_score: f64,
    pub insights: Vec<Insight>,
}

impl DocumentState {
    /// Initial state as produced by ingestion: pages and raw tables only.
    pub fn new(report_id: impl Into<String>, pages: Vec<Page>, tables: Vec<RawTable>) -> Self {
        Self {
            report_id: report_id.into(),
            pages,
            tables: tables.into_iter().map(TableArtifact::Raw).collect(),
            ..Self::default()
        }
    }

    /// Convenience constructor for text-only documents.
    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self::new("", pages, Vec::new())
    }

    pub fn critical_issue_count(&self) -> usize {
        self.validation_issues
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .count()
    }

    pub fn narrative_count(&self, sentiment: Sentiment) -> usize {
        self.narratives
            .iter()
            .filter(|n| n.sentiment == sentiment)
            .count()
    }

    /// Per-collection sizes, for logging and job summaries.
    pub fn counts(&self) -> StateCounts {
        StateCounts {
            pages: self.pages.len(),
            sections: self.sections.len(),
            tables: self.tables.len(),
            metrics: self.metrics.len(),
            narratives: self.narratives.len(),
            footnotes: self.footnotes.len(),
            issues: self.validation_issues.len(),
            insights: self.insights.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateCounts {
    pub pages: usize,
    pub sections: usize,
    pub tables: usize,
    pub metrics: usize,
    pub narratives: usize,
    pub footnotes: usize,
    pub issues: usize,
    pub insights: usize,
}
