//! Pipeline stages
//!
//! Each stage is a pure transform from one `DocumentState` to the next. Stages
//! own the state while they run and hand it back enriched; none of them keeps
//! anything between documents.
//!
//! # Built-in stages (in pipeline order)
//!
//! - **StructureStage**: heading-delimited sections per page
//! - **DomainStage**: keyword-scored topic labels
//! - **MetricStage**: pattern-matched quantitative values
//! - **TableStage**: sparse cell lists → rectangular tables
//! - **NarrativeStage**: prose blocks with sentiment
//! - **FootnoteStage**: footnote markers linked to metrics
//! - **ValidationStage**: data-quality issues and confidence score
//! - **InsightStage**: rule-based findings over everything above

mod domain;
mod footnotes;
mod insight;
mod metrics;
mod narrative;
mod structure;
mod tables;
mod validation;

pub use domain::DomainStage;
pub use footnotes::FootnoteStage;
pub use insight::InsightStage;
pub use metrics::MetricStage;
pub use narrative::NarrativeStage;
pub use structure::StructureStage;
pub use tables::{normalize_table, TableStage};
pub use validation::ValidationStage;

use crate::pipeline::PipelineError;
use crate::state::DocumentState;

/// A single transformation step in the pipeline.
///
/// # Example
///
/// ```ignore
/// struct UppercasePages;
///
/// impl Stage for UppercasePages {
///     fn id(&self) -> &str { "uppercase" }
///     fn name(&self) -> &str { "Uppercase Pages" }
///     fn apply(&self, mut state: DocumentState) -> Result<DocumentState, PipelineError> {
///         for page in &mut state.pages {
///             page.text = page.text.to_uppercase();
///         }
///         Ok(state)
///     }
/// }
/// ```
pub trait Stage: Send + Sync {
    /// Unique identifier, used in logs and error reports
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Transform the state.
    ///
    /// Must tolerate empty predecessor collections. Returning `Err` aborts the
    /// remainder of the run.
    fn apply(&self, state: DocumentState) -> Result<DocumentState, PipelineError>;
}
