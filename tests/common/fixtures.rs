//! Layout and document fixtures

use reportlens::ingest::{BoundingRegion, LayoutLine, LayoutPage, LayoutTable};
use reportlens::{LayoutResult, RawCell};
use std::path::{Path, PathBuf};

/// One layout page per entry; each entry is split into lines on `\n`.
pub fn layout_with_pages(pages: &[&str]) -> LayoutResult {
    LayoutResult {
        pages: pages
            .iter()
            .enumerate()
            .map(|(i, text)| LayoutPage {
                page_number: i as u32 + 1,
                lines: text
                    .split('\n')
                    .map(|l| LayoutLine {
                        content: l.to_string(),
                    })
                    .collect(),
            })
            .collect(),
        tables: Vec::new(),
    }
}

/// Add a table on `page` built from `(row, column, content)` triples.
pub fn layout_with_table(
    mut layout: LayoutResult,
    page: u32,
    cells: &[(usize, usize, &str)],
) -> LayoutResult {
    let row_count = cells.iter().map(|c| c.0.saturating_add(1)).max().unwrap_or(0);
    let column_count = cells.iter().map(|c| c.1.saturating_add(1)).max().unwrap_or(0);
    layout.tables.push(LayoutTable {
        bounding_regions: vec![BoundingRegion { page_number: page }],
        row_count,
        column_count,
        cells: cells
            .iter()
            .map(|(r, c, content)| RawCell::new(*r, *c, *content))
            .collect(),
    });
    layout
}

/// Serialize `layout` to `<dir>/<name>.json` and return the path.
pub fn write_layout(dir: &Path, name: &str, layout: &LayoutResult) -> PathBuf {
    let path = dir.join(format!("{name}.json"));
    std::fs::write(&path, serde_json::to_vec(layout).unwrap()).unwrap();
    path
}

/// A small but realistic multi-page annual report.
pub struct AnnualReport;

impl AnnualReport {
    pub const OVERVIEW: &'static str = "FINANCIAL HIGHLIGHTS\n\
        Revenue: $5,000,000 for the fiscal year, reflecting strong growth in every segment.\n\
        Net profit: $1,200,000 and operating margin 18.5%.\n\
        Growth: 12% year over year [1] restated\n\
        RISK FACTORS\n\
        Regulatory risk and supply chain exposure remain a challenge for the group.";

    pub const SUSTAINABILITY: &'static str = "SUSTAINABILITY REVIEW\n\
        Carbon emissions fell as renewable capacity increased and production efficiency improved.\n\
        Production 4,500 units per day.\n\
        * Emissions data is unaudited";

    pub fn layout() -> LayoutResult {
        layout_with_table(
            layout_with_pages(&[Self::OVERVIEW, Self::SUSTAINABILITY]),
            2,
            &[
                (0, 0, "Year"),
                (0, 1, "Revenue"),
                (1, 0, "2023"),
                (1, 1, "4500000"),
                (2, 0, "2024"),
                (2, 1, "5000000"),
            ],
        )
    }
}
