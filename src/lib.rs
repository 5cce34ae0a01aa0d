//! ReportLens: Corporate Report Extraction Pipeline
//!
//! Turns the layout analysis of a corporate report (annual report, ESG
//! disclosure, ...) into structured artifacts: sections, tables, metrics,
//! narrative blocks, footnotes, validation issues, a confidence score, and
//! rule-based insights.
//!
//! # Core Concepts
//!
//! - **DocumentState**: the single record threaded through every stage
//! - **Stages**: eight deterministic enrichment steps, run strictly in order
//! - **Pipeline**: the compiled, shareable execution plan
//! - **Jobs**: ingestion + pipeline + persistence for one document file
//!
//! # Example
//!
//! ```
//! use reportlens::{DocumentState, Page, Pipeline};
//!
//! let pipeline = Pipeline::standard();
//! let state = DocumentState::from_pages(vec![Page::new(1, "Revenue $5,000,000")]);
//! let state = pipeline.invoke(state).unwrap();
//! assert_eq!(state.metrics.len(), 1);
//! ```

pub mod config;
pub mod ingest;
pub mod job;
pub mod pipeline;
pub mod stage;
pub mod state;
pub mod store;

pub use config::{ConfigError, ReportLensConfig};
pub use ingest::{ingest, IngestError, JsonLayoutSource, LayoutResult, LayoutSource, StaticLayoutSource};
pub use job::{DocumentProcessor, DocumentStatus, JobOutcome, JobRequest, JobRunner};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineError};
pub use stage::Stage;
pub use state::{
    DocumentState, Domain, Footnote, Insight, InsightKind, IssueKind, Metric, Narrative,
    NormalizedTable, Page, Priority, RawCell, RawTable, Section, Sentiment, Severity, StateCounts,
    TableArtifact, ValidationIssue,
};
pub use store::{ArtifactStore, JsonDirStore, PersistReceipt, RunRecord, StoreError, StoreResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
