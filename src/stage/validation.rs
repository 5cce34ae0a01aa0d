//! Validation stage — data-quality issues and the confidence score
//!
//! This is the only place degenerate input is turned into a signal. It reads
//! whatever the earlier stages produced, records one issue per defect, and
//! never fails.

use super::Stage;
use crate::pipeline::PipelineError;
use crate::state::{DocumentState, IssueKind, Severity, ValidationIssue};
use tracing::info;

const MISSING_PAGES_PENALTY: f64 = 0.30;
const MISSING_HEADERS_PENALTY: f64 = 0.05;
const EMPTY_TABLE_PENALTY: f64 = 0.05;
const MINIMAL_SECTION_PENALTY: f64 = 0.02;
const NO_METRICS_PENALTY: f64 = 0.10;
const UNKNOWN_DOMAIN_PENALTY: f64 = 0.15;

/// Sections with content shorter than this are flagged.
const MIN_SECTION_CONTENT: usize = 10;

#[derive(Debug, Default)]
pub struct ValidationStage;

impl ValidationStage {
    pub fn new() -> Self {
        Self
    }
}

/// Issues collected so far plus the penalty they carry.
#[derive(Debug, Default)]
struct Ledger {
    issues: Vec<ValidationIssue>,
    penalty: f64,
}

impl Ledger {
    fn record(&mut self, issue: ValidationIssue, penalty: f64) {
        self.issues.push(issue);
        self.penalty += penalty;
    }

    fn confidence(&self) -> f64 {
        (1.0 - self.penalty).clamp(0.0, 1.0)
    }
}

fn audit(state: &DocumentState) -> Ledger {
    let mut ledger = Ledger::default();

    if state.pages.is_empty() {
        ledger.record(
            ValidationIssue::new(
                IssueKind::MissingPages,
                Severity::Critical,
                "No pages extracted from document",
            ),
            MISSING_PAGES_PENALTY,
        );
    }

    for (i, table) in state.tables.iter().enumerate() {
        if table.headers().is_empty() {
            ledger.record(
                ValidationIssue::new(
                    IssueKind::IncompleteTable,
                    Severity::Warning,
                    format!("Table {} has no headers", i),
                )
                .with_affected(format!("table_{}", i)),
                MISSING_HEADERS_PENALTY,
            );
        }
        if table.rows().is_empty() {
            ledger.record(
                ValidationIssue::new(
                    IssueKind::EmptyTable,
                    Severity::Warning,
                    format!("Table {} has no data rows", i),
                )
                .with_affected(format!("table_{}", i)),
                EMPTY_TABLE_PENALTY,
            );
        }
    }

    for (i, section) in state.sections.iter().enumerate() {
        if section.content.chars().count() < MIN_SECTION_CONTENT {
            ledger.record(
                ValidationIssue::new(
                    IssueKind::MinimalContent,
                    Severity::Info,
                    format!("Section {} has minimal content", i),
                )
                .with_affected(format!("section_{}", i)),
                MINIMAL_SECTION_PENALTY,
            );
        }
    }

    if state.metrics.is_empty() {
        ledger.record(
            ValidationIssue::new(IssueKind::NoMetrics, Severity::Info, "No metrics discovered"),
            NO_METRICS_PENALTY,
        );
    }

    if state.domains.is_empty() {
        ledger.record(
            ValidationIssue::new(
                IssueKind::UnknownDomain,
                Severity::Warning,
                "Document domain could not be determined",
            ),
            UNKNOWN_DOMAIN_PENALTY,
        );
    }

    ledger
}

impl Stage for ValidationStage {
    fn id(&self) -> &str {
        "validation"
    }

    fn name(&self) -> &str {
        "Validation"
    }

    fn apply(&self, mut state: DocumentState) -> Result<DocumentState, PipelineError> {
        let ledger = audit(&state);
        state.confidence_score = ledger.confidence();
        state.validation_issues = ledger.issues;

        info!(
            issues = state.validation_issues.len(),
            confidence = format!("{:.1}%", state.confidence_score * 100.0),
            "validation complete"
        );
        Ok(state)
    }
}
