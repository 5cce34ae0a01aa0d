//! Artifact records accumulated on the document state
//!
//! One struct per artifact kind. All of them serialize with camelCase field
//! names so the terminal state can be handed to an external store as-is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single page of extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub page_number: u32,
    pub text: String,
}

impl Page {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

/// A heading and the body text that follows it on the same page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub page_number: u32,
    pub heading: String,
    pub content: String,
    pub depth: u32,
}

/// Business-topic label assigned by keyword scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Finance,
    Esg,
    Operations,
    Risk,
    Market,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finance => "finance",
            Self::Esg => "esg",
            Self::Operations => "operations",
            Self::Risk => "risk",
            Self::Market => "market",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quantitative value found in page text or a table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub name: String,
    pub value: String,
    pub unit: String,
    pub page_number: u32,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// A block of prose with word count and a coarse sentiment label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    pub section_id: String,
    pub content: String,
    pub page_number: u32,
    pub word_count: usize,
    pub sentiment: Sentiment,
}

/// A footnote or reference, cross-linked to the metrics it annotates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footnote {
    /// Digit group from the marker, or `ref_<n>`. Not unique within a document.
    pub reference_id: String,
    pub page_number: u32,
    pub content: String,
    pub linked_metrics: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// Kind of data-quality defect detected by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingPages,
    IncompleteTable,
    EmptyTable,
    MinimalContent,
    NoMetrics,
    UnknownDomain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    pub affected_items: Vec<String>,
}

impl ValidationIssue {
    pub fn new(kind: IssueKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            affected_items: Vec::new(),
        }
    }

    pub fn with_affected(mut self, item: impl Into<String>) -> Self {
        self.affected_items.push(item.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Metric,
    Trend,
    /// Part of the persisted vocabulary; no built-in rule emits it.
    Comparison,
    Anomaly,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// A human-readable finding synthesized from the accumulated state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub priority: Priority,
    pub supporting_data: Vec<String>,
}
