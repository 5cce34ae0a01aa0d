//! Insight stage — rule-based synthesis over the accumulated state
//!
//! No new extraction happens here; every rule reads collections that earlier
//! stages already filled.

use super::Stage;
use crate::pipeline::PipelineError;
use crate::state::{
    DocumentState, Insight, InsightKind, Priority, Sentiment, Severity, TableArtifact,
};
use tracing::info;

const HIGH_CONFIDENCE: f64 = 0.8;
const MEDIUM_CONFIDENCE: f64 = 0.5;
/// More metrics than this counts as a data-rich document.
const RICH_METRIC_COUNT: usize = 5;

#[derive(Debug, Default)]
pub struct InsightStage;

impl InsightStage {
    pub fn new() -> Self {
        Self
    }
}

fn classification(state: &DocumentState) -> Option<Insight> {
    let primary = state.domains.first()?;
    let description = match state.domains.get(1) {
        Some(secondary) => format!(
            "This document is primarily focused on {} with secondary focus on {}",
            primary, secondary
        ),
        None => format!("This document is primarily focused on {}", primary),
    };
    Some(Insight {
        title: "Document Classification".into(),
        description,
        kind: InsightKind::Summary,
        priority: Priority::High,
        supporting_data: state.domains.iter().map(|d| d.to_string()).collect(),
    })
}

fn data_richness(state: &DocumentState) -> Option<Insight> {
    if state.metrics.len() <= RICH_METRIC_COUNT {
        return None;
    }
    Some(Insight {
        title: "Rich Quantitative Data".into(),
        description: format!(
            "Found {} quantitative metrics throughout the document, indicating strong data-driven reporting",
            state.metrics.len()
        ),
        kind: InsightKind::Metric,
        priority: Priority::Medium,
        supporting_data: state
            .metrics
            .iter()
            .take(RICH_METRIC_COUNT)
            .map(|m| m.name.clone())
            .collect(),
    })
}

fn structured_data(state: &DocumentState) -> Option<Insight> {
    let first = state.tables.first()?;
    // first table wins ties
    let largest = state
        .tables
        .iter()
        .fold(first, |max, t| if t.row_count() > max.row_count() { t } else { max });

    Some(Insight {
        title: "Structured Data Present".into(),
        description: format!(
            "Document contains {} tables with structured data. Largest table has {} rows.",
            state.tables.len(),
            largest.row_count()
        ),
        kind: InsightKind::Metric,
        priority: Priority::Medium,
        supporting_data: vec![
            format!("{} tables found", state.tables.len()),
            headline(largest),
        ],
    })
}

/// Short label for a table: its headers when it has any.
fn headline(table: &TableArtifact) -> String {
    if table.headers().is_empty() {
        format!("table on page {}", table.page_number())
    } else {
        table.headers().join(" | ")
    }
}

fn data_quality(state: &DocumentState) -> Option<Insight> {
    let critical: Vec<String> = state
        .validation_issues
        .iter()
        .filter(|i| i.severity == Severity::Critical)
        .map(|i| i.message.clone())
        .collect();
    if critical.is_empty() {
        return None;
    }
    Some(Insight {
        title: "Data Quality Concerns".into(),
        description: format!(
            "Detected {} critical issues that may affect data reliability",
            critical.len()
        ),
        kind: InsightKind::Anomaly,
        priority: Priority::High,
        supporting_data: critical,
    })
}

fn confidence(state: &DocumentState) -> Insight {
    let score = state.confidence_score;
    let (tone, priority) = if score > HIGH_CONFIDENCE {
        ("Data extraction quality is high.", Priority::Low)
    } else if score > MEDIUM_CONFIDENCE {
        ("Some data quality issues detected.", Priority::High)
    } else {
        ("Multiple data quality concerns present.", Priority::High)
    };
    Insight {
        title: "Extraction Confidence".into(),
        description: format!("Processing confidence score: {:.1}%. {}", score * 100.0, tone),
        kind: InsightKind::Summary,
        priority,
        supporting_data: vec![format!("{:.2}", score)],
    }
}

fn sentiment_trend(state: &DocumentState) -> Option<Insight> {
    let positive = state.narrative_count(Sentiment::Positive);
    let negative = state.narrative_count(Sentiment::Negative);
    if positive <= negative {
        return None;
    }
    Some(Insight {
        title: "Positive Sentiment Trend".into(),
        description: format!(
            "Narrative analysis suggests positive outlook with {} positive vs {} negative sections",
            positive, negative
        ),
        kind: InsightKind::Trend,
        priority: Priority::Medium,
        supporting_data: vec![
            format!("Positive: {}", positive),
            format!("Negative: {}", negative),
        ],
    })
}

impl Stage for InsightStage {
    fn id(&self) -> &str {
        "insight"
    }

    fn name(&self) -> &str {
        "Insight Synthesis"
    }

    fn apply(&self, mut state: DocumentState) -> Result<DocumentState, PipelineError> {
        let insights: Vec<Insight> = [
            classification(&state),
            data_richness(&state),
            structured_data(&state),
            data_quality(&state),
            Some(confidence(&state)),
            sentiment_trend(&state),
        ]
        .into_iter()
        .flatten()
        .collect();

        state.insights = insights;
        info!(insights = state.insights.len(), "generated insights");
        Ok(state)
    }
}
