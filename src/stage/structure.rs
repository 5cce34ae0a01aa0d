//! Structure stage — heading-delimited sections
//!
//! Layout analysis gives us flat page text with no markup, so headings are
//! recognised by shape: short-to-medium lines written entirely in upper case.

use super::Stage;
use crate::pipeline::PipelineError;
use crate::state::{DocumentState, Page, Section};
use tracing::info;

const MIN_HEADING_CHARS: usize = 5;
const MAX_HEADING_CHARS: usize = 100;

/// Partitions every page into sections.
///
/// A heading closes the open section and starts a new one; following
/// non-empty lines accumulate into its content. Text before the first heading
/// on a page is not attributed to any section, and a page without headings
/// yields no sections.
#[derive(Debug, Default)]
pub struct StructureStage;

impl StructureStage {
    pub fn new() -> Self {
        Self
    }
}

/// Whether a trimmed line looks like a heading.
fn is_heading(line: &str) -> bool {
    let len = line.chars().count();
    len > MIN_HEADING_CHARS && len < MAX_HEADING_CHARS && line == line.to_uppercase()
}

fn sections_for_page(page: &Page) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut open: Option<Section> = None;

    for line in page.text.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
        if is_heading(line) {
            if let Some(done) = open.take() {
                sections.push(done);
            }
            open = Some(Section {
                page_number: page.page_number,
                heading: line.to_string(),
                content: String::new(),
                depth: 1,
            });
        } else if let Some(section) = open.as_mut() {
            if !section.content.is_empty() {
                section.content.push(' ');
            }
            section.content.push_str(line);
        }
    }

    sections.extend(open);
    sections
}

impl Stage for StructureStage {
    fn id(&self) -> &str {
        "structure"
    }

    fn name(&self) -> &str {
        "Structure"
    }

    fn apply(&self, mut state: DocumentState) -> Result<DocumentState, PipelineError> {
        state.sections = state.pages.iter().flat_map(sections_for_page).collect();
        info!(
            sections = state.sections.len(),
            tables = state.tables.len(),
            "identified document sections"
        );
        Ok(state)
    }
}
