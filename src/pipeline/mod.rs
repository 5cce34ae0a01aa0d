//! Pipeline orchestration
//!
//! A `PipelineBuilder` collects stages in registration order and compiles them
//! into an immutable `Pipeline`. Invocation threads one `DocumentState`
//! through the stages strictly in sequence and stops at the first failure.
//!
//! A compiled pipeline holds no per-document data, so one instance can be
//! shared behind an `Arc` by any number of concurrent document runs.

use crate::config::ReportLensConfig;
use crate::ingest::IngestError;
use crate::stage::{
    DomainStage, FootnoteStage, InsightStage, MetricStage, NarrativeStage, Stage, StructureStage,
    TableStage, ValidationStage,
};
use crate::state::DocumentState;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, info_span};

/// Errors that abort a document run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("ingestion failed: {0}")]
    Ingest(#[from] IngestError),

    #[error("stage '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },
}

impl PipelineError {
    pub fn stage_failed(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageFailed {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

/// Collects stages before compilation
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The eight document stages in their fixed order, tuned from `config`.
    pub fn standard(config: &ReportLensConfig) -> Self {
        let limits = &config.limits;
        Self::new()
            .register(StructureStage::new())
            .register(DomainStage::new().with_max_domains(limits.max_domains))
            .register(
                MetricStage::new()
                    .with_max_metrics(limits.max_metrics)
                    .with_context_window(limits.context_window),
            )
            .register(TableStage::new())
            .register(NarrativeStage::new())
            .register(FootnoteStage::new().with_max_footnotes(limits.max_footnotes))
            .register(ValidationStage::new())
            .register(InsightStage::new())
    }

    /// Append a stage; it runs after everything registered so far.
    pub fn register<S: Stage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Freeze the registered stages into an executable pipeline.
    pub fn compile(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

/// Immutable, shareable execution plan
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_ids())
            .finish()
    }
}

impl Pipeline {
    /// Standard pipeline with default limits.
    pub fn standard() -> Self {
        PipelineBuilder::standard(&ReportLensConfig::default()).compile()
    }

    pub fn stage_ids(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.id()).collect()
    }

    /// Run every stage in order and return the final state.
    ///
    /// The first stage error is returned as-is; no later stage runs and the
    /// partially enriched state is dropped.
    pub fn invoke(&self, state: DocumentState) -> Result<DocumentState, PipelineError> {
        let started = Instant::now();
        let report_id = state.report_id.clone();

        let mut state = state;
        for stage in &self.stages {
            let span = info_span!("stage", id = stage.id(), report_id = %report_id);
            let _enter = span.enter();

            let stage_started = Instant::now();
            state = stage.apply(state)?;
            debug!(
                stage = stage.name(),
                elapsed_ms = stage_started.elapsed().as_millis() as u64,
                "stage finished"
            );
        }

        info!(
            report_id = %report_id,
            stages = self.stages.len(),
            confidence = state.confidence_score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline complete"
        );
        Ok(state)
    }
}
