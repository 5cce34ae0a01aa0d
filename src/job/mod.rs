//! Document jobs — ingestion, pipeline, and persistence for one file at a time
//!
//! `DocumentProcessor` turns a `JobRequest` into a `JobOutcome` and never
//! propagates an error: any fatal failure becomes a `Failed` outcome carrying
//! the message. `JobRunner` fans a batch of requests out over tokio tasks with
//! a semaphore bounding how many documents are in flight.

use crate::ingest::{self, LayoutSource};
use crate::pipeline::{Pipeline, PipelineError};
use crate::state::{DocumentState, StateCounts};
use crate::store::ArtifactStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub report_id: String,
    pub file_path: PathBuf,
    /// Attempts already made by the caller's queue; carried for logging only.
    #[serde(default)]
    pub retry_count: u32,
}

impl JobRequest {
    pub fn new(report_id: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            report_id: report_id.into(),
            file_path: file_path.into(),
            retry_count: 0,
        }
    }

    /// Report id derived from a file's stem, `report` when it has none.
    pub fn id_for_path(path: &Path) -> String {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_string())
    }

    /// One request per path, ids taken from file stems.
    ///
    /// A stem already used earlier in the batch gets the first free `-<n>`
    /// suffix, starting at 2, so no two jobs share an output directory.
    pub fn batch(paths: impl IntoIterator<Item = PathBuf>) -> Vec<Self> {
        let mut taken = HashSet::new();
        paths
            .into_iter()
            .map(|path| {
                let stem = Self::id_for_path(&path);
                let mut id = stem.clone();
                let mut n = 1;
                while !taken.insert(id.clone()) {
                    n += 1;
                    id = format!("{stem}-{n}");
                }
                Self::new(id, path)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutcome {
    pub report_id: String,
    pub status: DocumentStatus,
    pub confidence_score: Option<f64>,
    pub error: Option<String>,
    pub counts: StateCounts,
    /// Final state; `None` when the run failed.
    #[serde(skip)]
    pub state: Option<DocumentState>,
}

impl JobOutcome {
    fn completed(report_id: String, state: DocumentState) -> Self {
        Self {
            report_id,
            status: DocumentStatus::Completed,
            confidence_score: Some(state.confidence_score),
            error: None,
            counts: state.counts(),
            state: Some(state),
        }
    }

    fn failed(report_id: String, error: String) -> Self {
        Self {
            report_id,
            status: DocumentStatus::Failed,
            confidence_score: None,
            error: Some(error),
            counts: StateCounts::default(),
            state: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == DocumentStatus::Completed
    }
}

/// Failure somewhere in a job, before it is flattened into an outcome.
#[derive(Debug, thiserror::Error)]
enum JobError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("persistence failed: {0}")]
    Store(#[from] crate::store::StoreError),
}

/// Runs one document end to end.
pub struct DocumentProcessor {
    source: Arc<dyn LayoutSource>,
    pipeline: Arc<Pipeline>,
    store: Option<Arc<dyn ArtifactStore>>,
}

impl DocumentProcessor {
    pub fn new(source: Arc<dyn LayoutSource>, pipeline: Arc<Pipeline>) -> Self {
        Self {
            source,
            pipeline,
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn process(&self, job: JobRequest) -> JobOutcome {
        info!(
            report_id = %job.report_id,
            path = %job.file_path.display(),
            retry_count = job.retry_count,
            "starting document job"
        );

        match self.run(&job).await {
            Ok(state) => {
                let counts = state.counts();
                info!(
                    report_id = %job.report_id,
                    pages = counts.pages,
                    sections = counts.sections,
                    tables = counts.tables,
                    metrics = counts.metrics,
                    narratives = counts.narratives,
                    confidence = format!("{:.1}%", state.confidence_score * 100.0),
                    "document job completed"
                );
                JobOutcome::completed(job.report_id, state)
            }
            Err(e) => {
                warn!(report_id = %job.report_id, error = %e, "document job failed");
                JobOutcome::failed(job.report_id, e.to_string())
            }
        }
    }

    async fn run(&self, job: &JobRequest) -> Result<DocumentState, JobError> {
        let initial = ingest::ingest(self.source.as_ref(), &job.report_id, &job.file_path)
            .await
            .map_err(PipelineError::from)?;

        let pipeline = self.pipeline.clone();
        // Stages are CPU-bound; keep them off the async worker threads.
        let state = tokio::task::spawn_blocking(move || pipeline.invoke(initial))
            .await
            .map_err(|e| PipelineError::stage_failed("pipeline", e.to_string()))??;

        if let Some(store) = &self.store {
            store.persist(&job.report_id, &state).await?;
        }
        Ok(state)
    }
}

/// Processes batches of jobs with bounded concurrency.
pub struct JobRunner {
    processor: Arc<DocumentProcessor>,
    semaphore: Arc<Semaphore>,
}

impl JobRunner {
    pub fn new(processor: DocumentProcessor) -> Self {
        Self {
            processor: Arc::new(processor),
            semaphore: Arc::new(Semaphore::new(2)),
        }
    }

    /// Maximum number of documents processed at once (at least 1).
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.semaphore = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    /// Run every job and return outcomes in submission order.
    pub async fn run_all(&self, jobs: Vec<JobRequest>) -> Vec<JobOutcome> {
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|job| {
                let processor = self.processor.clone();
                let semaphore = self.semaphore.clone();
                let report_id = job.report_id.clone();
                let handle = tokio::spawn(async move {
                    // acquire only errors on a closed semaphore; this one never closes
                    let _permit = semaphore.acquire_owned().await.ok();
                    processor.process(job).await
                });
                (report_id, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (report_id, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => JobOutcome::failed(report_id, format!("job task aborted: {e}")),
            };
            outcomes.push(outcome);
        }

        let completed = outcomes.iter().filter(|o| o.is_completed()).count();
        info!(
            jobs = outcomes.len(),
            completed,
            failed = outcomes.len() - completed,
            "batch finished"
        );
        outcomes
    }
}
