//! Ingestion boundary — layout analysis results into an initial document state
//!
//! The layout service itself lives outside this crate. A `LayoutSource`
//! abstracts over how its result is obtained:
//! - `JsonLayoutSource`: reads a stored layout-analysis JSON document
//! - `StaticLayoutSource`: returns a preconfigured result (testing, demos)

use crate::state::{DocumentState, Page, RawCell, RawTable, MAX_GRID_COLUMNS, MAX_GRID_ROWS};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Fatal ingestion failures. Any of these aborts the document run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed layout result: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("layout service failed: {0}")]
    Service(String),

    #[error("layout result for {0} contains no pages and no tables")]
    EmptyDocument(PathBuf),

    #[error(
        "table {table} addresses cell ({row}, {column}) outside the {}x{} grid",
        MAX_GRID_ROWS,
        MAX_GRID_COLUMNS
    )]
    CellOutOfRange {
        table: usize,
        row: usize,
        column: usize,
    },
}

/// Layout-analysis output, mirroring the service's JSON shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    #[serde(default)]
    pub pages: Vec<LayoutPage>,
    #[serde(default)]
    pub tables: Vec<LayoutTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPage {
    pub page_number: u32,
    #[serde(default)]
    pub lines: Vec<LayoutLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutLine {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutTable {
    #[serde(default)]
    pub bounding_regions: Vec<BoundingRegion>,
    #[serde(default)]
    pub row_count: usize,
    #[serde(default)]
    pub column_count: usize,
    #[serde(default)]
    pub cells: Vec<RawCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingRegion {
    pub page_number: u32,
}

impl LayoutResult {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.tables.is_empty()
    }

    /// Reject the first table cell addressed outside the supported grid.
    pub fn check_grid_limits(&self) -> Result<(), IngestError> {
        for (table, t) in self.tables.iter().enumerate() {
            if let Some(cell) = t.cells.iter().find(|c| !c.within_grid_limits()) {
                return Err(IngestError::CellOutOfRange {
                    table,
                    row: cell.row_index,
                    column: cell.column_index,
                });
            }
        }
        Ok(())
    }
}

/// Source of layout-analysis results for a document file.
///
/// Abstracts over transport (stored JSON, remote service, fixture) so the
/// job layer doesn't depend on how layout analysis is reached.
#[async_trait]
pub trait LayoutSource: Send + Sync {
    async fn analyze(&self, path: &Path) -> Result<LayoutResult, IngestError>;
}

/// Reads a layout result previously saved as JSON.
///
/// `path` is the JSON file itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLayoutSource;

impl JsonLayoutSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LayoutSource for JsonLayoutSource {
    async fn analyze(&self, path: &Path) -> Result<LayoutResult, IngestError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| IngestError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let result: LayoutResult = serde_json::from_str(&raw)?;
        debug!(
            path = %path.display(),
            pages = result.pages.len(),
            tables = result.tables.len(),
            "loaded layout result"
        );
        Ok(result)
    }
}

/// Returns the same preconfigured result for every path.
#[derive(Debug, Clone)]
pub struct StaticLayoutSource {
    outcome: Result<LayoutResult, String>,
}

impl StaticLayoutSource {
    pub fn new(result: LayoutResult) -> Self {
        Self {
            outcome: Ok(result),
        }
    }

    /// A source whose every call fails with `IngestError::Service`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
        }
    }
}

#[async_trait]
impl LayoutSource for StaticLayoutSource {
    async fn analyze(&self, _path: &Path) -> Result<LayoutResult, IngestError> {
        self.outcome.clone().map_err(IngestError::Service)
    }
}

/// Flatten a layout result into pages and raw tables.
///
/// Each page's lines are joined with newlines. A table's page is the page of
/// its first bounding region, or 1 when the service reported none.
pub fn to_state(report_id: &str, layout: LayoutResult) -> DocumentState {
    let pages = layout
        .pages
        .into_iter()
        .map(|page| {
            let text = page
                .lines
                .iter()
                .map(|l| l.content.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            Page::new(page.page_number, text)
        })
        .collect();

    let tables = layout
        .tables
        .into_iter()
        .map(|table| RawTable {
            page_number: table
                .bounding_regions
                .first()
                .map(|r| r.page_number)
                .unwrap_or(1),
            row_count: table.row_count,
            column_count: table.column_count,
            cells: table.cells,
        })
        .collect();

    DocumentState::new(report_id, pages, tables)
}

/// Run layout analysis on `path` and build the initial state.
pub async fn ingest(
    source: &dyn LayoutSource,
    report_id: &str,
    path: &Path,
) -> Result<DocumentState, IngestError> {
    let layout = source.analyze(path).await?;
    if layout.is_empty() {
        return Err(IngestError::EmptyDocument(path.to_path_buf()));
    }
    layout.check_grid_limits()?;

    let state = to_state(report_id, layout);
    info!(
        report_id,
        pages = state.pages.len(),
        tables = state.tables.len(),
        "ingested document"
    );
    Ok(state)
}
