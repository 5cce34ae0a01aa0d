//! Domain stage — keyword-scored topic classification

use super::Stage;
use crate::pipeline::PipelineError;
use crate::state::{Domain, DocumentState};
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

/// Keyword signatures, in tie-break order.
const DOMAIN_SIGNATURES: &[(Domain, &[&str])] = &[
    (
        Domain::Finance,
        &[
            "revenue",
            "profit",
            "ebitda",
            "gross margin",
            "cash flow",
            "earnings",
            "financial",
            "debt",
            "equity",
        ],
    ),
    (
        Domain::Esg,
        &[
            "carbon",
            "emissions",
            "sustainability",
            "environmental",
            "social",
            "governance",
            "diversity",
            "renewable",
            "esg",
            "sdg",
        ],
    ),
    (
        Domain::Operations,
        &[
            "operational",
            "efficiency",
            "capacity",
            "production",
            "supply chain",
            "logistics",
            "quality",
            "process",
            "manufacturing",
        ],
    ),
    (
        Domain::Risk,
        &[
            "risk",
            "compliance",
            "regulatory",
            "audit",
            "internal control",
            "exposure",
            "mitigation",
            "threat",
        ],
    ),
    (
        Domain::Market,
        &[
            "market share",
            "customer",
            "market",
            "competitive",
            "industry",
            "segment",
            "product",
            "sales",
        ],
    ),
];

/// One whole-word regex per keyword, compiled once per process.
static KEYWORD_REGEXES: LazyLock<Vec<(Domain, Vec<Regex>)>> = LazyLock::new(|| {
    DOMAIN_SIGNATURES
        .iter()
        .map(|(domain, keywords)| {
            let regexes = keywords
                .iter()
                .map(|kw| {
                    Regex::new(&format!(r"\b{}\b", regex::escape(kw)))
                        .expect("keyword regex built from escaped literal")
                })
                .collect();
            (*domain, regexes)
        })
        .collect()
});

/// Scores every signature against the document and keeps the top labels.
#[derive(Debug)]
pub struct DomainStage {
    max_domains: usize,
}

impl Default for DomainStage {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainStage {
    pub fn new() -> Self {
        Self { max_domains: 3 }
    }

    pub fn with_max_domains(mut self, max: usize) -> Self {
        self.max_domains = max;
        self
    }
}

/// Occurrence score per domain, signature order, zero scores included.
pub(crate) fn score_domains(text: &str) -> Vec<(Domain, usize)> {
    let lowered = text.to_lowercase();
    KEYWORD_REGEXES
        .iter()
        .map(|(domain, regexes)| {
            let score = regexes.iter().map(|re| re.find_iter(&lowered).count()).sum();
            (*domain, score)
        })
        .collect()
}

/// Rank domains by score, dropping zeros. Ties keep signature order.
fn rank(scores: Vec<(Domain, usize)>, max: usize) -> Vec<Domain> {
    let mut scored: Vec<_> = scores.into_iter().filter(|(_, s)| *s > 0).collect();
    // sort_by is stable
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().take(max).map(|(d, _)| d).collect()
}

impl Stage for DomainStage {
    fn id(&self) -> &str {
        "domain"
    }

    fn name(&self) -> &str {
        "Domain Classification"
    }

    fn apply(&self, mut state: DocumentState) -> Result<DocumentState, PipelineError> {
        let full_text = state
            .pages
            .iter()
            .map(|p| p.text.as_str())
            .chain(state.sections.iter().map(|s| s.content.as_str()))
            .collect::<Vec<_>>()
            .join(" ");

        state.domains = rank(score_domains(&full_text), self.max_domains);

        if state.domains.is_empty() {
            info!("no domain signature matched; domain unknown");
        } else {
            let labels: Vec<&str> = state.domains.iter().map(Domain::as_str).collect();
            info!(domains = %labels.join(", "), "detected domains");
        }
        Ok(state)
    }
}
