//! Table stage — rectangular reconstruction of sparse cell grids

use super::metrics::is_numeric_cell;
use super::Stage;
use crate::pipeline::PipelineError;
use crate::state::{
    DocumentState, NormalizedTable, TableArtifact, MAX_GRID_COLUMNS, MAX_GRID_ROWS,
};
use tracing::{debug, info};

/// Replaces every table on the state with its normalized form.
#[derive(Debug, Default)]
pub struct TableStage;

impl TableStage {
    pub fn new() -> Self {
        Self
    }
}

/// Rebuild a dense grid from a table's cells and promote row 0 to headers.
///
/// Grid height is the highest populated row index + 1; width is the longest
/// row. Missing positions become empty strings, so the output is always
/// rectangular. Normalizing an already-normalized table returns it unchanged.
///
/// Cells addressed beyond `MAX_GRID_ROWS` x `MAX_GRID_COLUMNS` are dropped.
pub fn normalize_table(table: &TableArtifact) -> NormalizedTable {
    let mut grid: Vec<Vec<Option<String>>> = Vec::new();
    let mut dropped = 0usize;

    for (row, col, content) in table.cells() {
        if row >= MAX_GRID_ROWS || col >= MAX_GRID_COLUMNS {
            dropped += 1;
            continue;
        }
        if grid.len() <= row {
            grid.resize_with(row + 1, Vec::new);
        }
        let cells = &mut grid[row];
        if cells.len() <= col {
            cells.resize(col + 1, None);
        }
        cells[col] = Some(content.to_string());
    }

    if dropped > 0 {
        debug!(
            dropped,
            page = table.page_number(),
            "dropped cells outside the table grid"
        );
    }

    let column_count = grid.iter().map(Vec::len).max().unwrap_or(0);

    let mut dense = grid.into_iter().map(|row| {
        let mut cells: Vec<String> = row
            .into_iter()
            .map(|c| c.map(|s| s.trim().to_string()).unwrap_or_default())
            .collect();
        cells.resize(column_count, String::new());
        cells
    });

    let headers = dense.next().unwrap_or_default();
    let rows: Vec<Vec<String>> = dense.collect();

    let has_numeric = rows.iter().flatten().any(|cell| is_numeric_cell(cell));
    let mut summary = format!("Table with {} rows, {} columns.", rows.len(), column_count);
    if has_numeric {
        summary.push_str(" Contains numeric data.");
    }

    NormalizedTable {
        page_number: table.page_number(),
        row_count: rows.len(),
        column_count,
        headers,
        rows,
        summary,
    }
}

impl Stage for TableStage {
    fn id(&self) -> &str {
        "tables"
    }

    fn name(&self) -> &str {
        "Table Normalization"
    }

    fn apply(&self, mut state: DocumentState) -> Result<DocumentState, PipelineError> {
        for table in state.tables.iter_mut() {
            *table = TableArtifact::Normalized(normalize_table(table));
        }
        info!(tables = state.tables.len(), "normalized tables");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{RawCell, RawTable};

    fn raw(cells: Vec<RawCell>) -> TableArtifact {
        TableArtifact::Raw(RawTable {
            page_number: 7,
            row_count: 0,
            column_count: 0,
            cells,
        })
    }

    #[test]
    fn sparse_cells_fill_with_empty_strings() {
        let table = normalize_table(&raw(vec![
            RawCell::new(0, 0, "A"),
            RawCell::new(0, 1, "B"),
            RawCell::new(1, 0, "1"),
        ]));

        assert_eq!(table.headers, vec!["A", "B"]);
        assert_eq!(table.rows, vec![vec!["1".to_string(), String::new()]]);
        assert_eq!(table.row_count, 1);
        assert_eq!(table.column_count, 2);
        assert_eq!(table.page_number, 7);
        assert_eq!(table.summary, "Table with 1 rows, 2 columns. Contains numeric data.");
    }

    #[test]
    fn missing_rows_and_unordered_cells_are_handled() {
        let table = normalize_table(&raw(vec![
            RawCell::new(3, 2, " tail "),
            RawCell::new(0, 0, " Head "),
        ]));

        assert_eq!(table.headers, vec!["Head", "", ""]);
        assert_eq!(table.row_count, 3);
        assert!(table.rows.iter().all(|r| r.len() == 3));
        assert_eq!(table.rows[2], vec!["", "", "tail"]);
        assert_eq!(table.summary, "Table with 3 rows, 3 columns.");
    }

    #[test]
    fn empty_table_is_not_an_error() {
        let table = normalize_table(&raw(vec![]));
        assert_eq!(table.row_count, 0);
        assert_eq!(table.column_count, 0);
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn header_only_table_has_no_rows() {
        let table = normalize_table(&raw(vec![RawCell::new(0, 0, "Only")]));
        assert_eq!(table.headers, vec!["Only"]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn out_of_range_cell_indices_are_dropped() {
        let table = normalize_table(&raw(vec![
            RawCell::new(0, 0, "Year"),
            RawCell::new(1, 0, "2024"),
            RawCell::new(usize::MAX, 0, "overflow"),
            RawCell::new(MAX_GRID_ROWS, 1, "tall"),
            RawCell::new(1, MAX_GRID_COLUMNS, "wide"),
        ]));

        assert_eq!(table.headers, vec!["Year"]);
        assert_eq!(table.rows, vec![vec!["2024".to_string()]]);
        assert_eq!(table.column_count, 1);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_table(&raw(vec![
            RawCell::new(0, 0, "Year"),
            RawCell::new(0, 1, "Value"),
            RawCell::new(2, 1, "42"),
        ]));
        let twice = normalize_table(&TableArtifact::Normalized(once.clone()));
        assert_eq!(once, twice);
    }

    #[test]
    fn stage_replaces_tables_in_place() {
        let mut state = DocumentState::default();
        state.tables.push(raw(vec![RawCell::new(0, 0, "x")]));
        state.tables.push(raw(vec![]));

        let state = TableStage::new().apply(state).unwrap();
        assert_eq!(state.tables.len(), 2);
        assert!(state.tables.iter().all(TableArtifact::is_normalized));
    }
}
