//! Table artifacts: the sparse cell lists produced by layout analysis and the
//! dense rectangular form produced by normalization.

use serde::{Deserialize, Serialize};

/// Largest grid a raw table may address, in rows.
pub const MAX_GRID_ROWS: usize = 4096;
/// Largest grid a raw table may address, in columns.
pub const MAX_GRID_COLUMNS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCell {
    pub row_index: usize,
    pub column_index: usize,
    #[serde(default)]
    pub content: String,
}

impl RawCell {
    pub fn new(row_index: usize, column_index: usize, content: impl Into<String>) -> Self {
        Self {
            row_index,
            column_index,
            content: content.into(),
        }
    }

    /// Whether the cell's position fits inside the supported grid.
    pub fn within_grid_limits(&self) -> bool {
        self.row_index < MAX_GRID_ROWS && self.column_index < MAX_GRID_COLUMNS
    }
}

/// Table as reported by the layout service.
///
/// `row_count`/`column_count` are the service's claims; the cell list may be
/// sparse, out of order, or disagree with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTable {
    pub page_number: u32,
    pub row_count: usize,
    pub column_count: usize,
    pub cells: Vec<RawCell>,
}

/// Rectangular table with the first grid row promoted to headers.
///
/// Every row in `rows` has exactly `column_count` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTable {
    pub page_number: u32,
    /// Number of data rows (the header row is not counted).
    pub row_count: usize,
    pub column_count: usize,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub summary: String,
}

/// A table slot on the document state.
///
/// Ingestion fills `Raw` entries; normalization replaces each one in place
/// with its `Normalized` counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum TableArtifact {
    Raw(RawTable),
    Normalized(NormalizedTable),
}

impl TableArtifact {
    pub fn page_number(&self) -> u32 {
        match self {
            Self::Raw(t) => t.page_number,
            Self::Normalized(t) => t.page_number,
        }
    }

    pub fn is_normalized(&self) -> bool {
        matches!(self, Self::Normalized(_))
    }

    pub fn as_normalized(&self) -> Option<&NormalizedTable> {
        match self {
            Self::Normalized(t) => Some(t),
            Self::Raw(_) => None,
        }
    }

    /// All cells as `(row, column, content)` in grid coordinates.
    ///
    /// For a normalized table the header row is row 0 and data rows follow.
    pub fn cells(&self) -> Vec<(usize, usize, &str)> {
        match self {
            Self::Raw(t) => t
                .cells
                .iter()
                .map(|c| (c.row_index, c.column_index, c.content.as_str()))
                .collect(),
            Self::Normalized(t) => {
                let header = std::iter::once(&t.headers);
                header
                    .chain(t.rows.iter())
                    .enumerate()
                    .flat_map(|(r, row)| {
                        row.iter()
                            .enumerate()
                            .map(move |(c, content)| (r, c, content.as_str()))
                    })
                    .collect()
            }
        }
    }

    /// Header labels; empty until the table has been normalized.
    pub fn headers(&self) -> &[String] {
        match self {
            Self::Normalized(t) => &t.headers,
            Self::Raw(_) => &[],
        }
    }

    /// Data rows; empty until the table has been normalized.
    pub fn rows(&self) -> &[Vec<String>] {
        match self {
            Self::Normalized(t) => &t.rows,
            Self::Raw(_) => &[],
        }
    }

    /// Data row count (normalized) or the service-reported row count (raw).
    pub fn row_count(&self) -> usize {
        match self {
            Self::Raw(t) => t.row_count,
            Self::Normalized(t) => t.row_count,
        }
    }
}

impl From<RawTable> for TableArtifact {
    fn from(table: RawTable) -> Self {
        Self::Raw(table)
    }
}

impl From<NormalizedTable> for TableArtifact {
    fn from(table: NormalizedTable) -> Self {
        Self::Normalized(table)
    }
}
