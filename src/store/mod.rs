//! Artifact persistence
//!
//! The pipeline hands back a finished `DocumentState`; storing it is the
//! caller's concern. `ArtifactStore` is the seam, `JsonDirStore` the stock
//! implementation: one directory per report, one JSON file per artifact kind.

use crate::state::{DocumentState, Domain};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Errors that can occur while persisting artifacts
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid report id {0:?}: must be a single plain path segment")]
    InvalidReportId(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Summary of one persisted run, written as `run.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub report_id: String,
    pub completed_at: DateTime<Utc>,
    pub confidence_score: f64,
    pub domains: Vec<Domain>,
    pub total_pages: usize,
}

/// What a store reports back after persisting.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistReceipt {
    pub run_id: Uuid,
    pub location: PathBuf,
    pub files: Vec<PathBuf>,
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist every artifact collection of a finished state.
    async fn persist(&self, report_id: &str, state: &DocumentState) -> StoreResult<PersistReceipt>;
}

/// Writes artifacts as pretty-printed JSON under `<root>/<report_id>/`.
///
/// Re-persisting a report overwrites its previous files.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory for one report's artifacts, always directly under the root.
    pub fn report_dir(&self, report_id: &str) -> StoreResult<PathBuf> {
        let mut components = Path::new(report_id).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(segment)), None) if segment == report_id => {
                Ok(self.root.join(segment))
            }
            _ => Err(StoreError::InvalidReportId(report_id.to_string())),
        }
    }

    async fn write_json<T: Serialize + ?Sized>(
        dir: &Path,
        name: &str,
        value: &T,
    ) -> StoreResult<PathBuf> {
        let path = dir.join(name);
        let body = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&path, body).await?;
        Ok(path)
    }
}

#[async_trait]
impl ArtifactStore for JsonDirStore {
    async fn persist(&self, report_id: &str, state: &DocumentState) -> StoreResult<PersistReceipt> {
        let dir = self.report_dir(report_id)?;
        tokio::fs::create_dir_all(&dir).await?;

        let mut files = vec![
            Self::write_json(&dir, "sections.json", &state.sections).await?,
            Self::write_json(&dir, "tables.json", &state.tables).await?,
            Self::write_json(&dir, "metrics.json", &state.metrics).await?,
            Self::write_json(&dir, "narratives.json", &state.narratives).await?,
            Self::write_json(&dir, "footnotes.json", &state.footnotes).await?,
            Self::write_json(&dir, "validation_issues.json", &state.validation_issues).await?,
            Self::write_json(&dir, "insights.json", &state.insights).await?,
        ];

        let record = RunRecord {
            run_id: Uuid::new_v4(),
            report_id: report_id.to_string(),
            completed_at: Utc::now(),
            confidence_score: state.confidence_score,
            domains: state.domains.clone(),
            total_pages: state.pages.len(),
        };
        files.push(Self::write_json(&dir, "run.json", &record).await?);

        info!(
            report_id,
            run_id = %record.run_id,
            files = files.len(),
            dir = %dir.display(),
            "persisted artifacts"
        );

        Ok(PersistReceipt {
            run_id: record.run_id,
            location: dir,
            files,
        })
    }
}
