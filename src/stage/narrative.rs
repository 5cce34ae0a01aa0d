//! Narrative stage — prose blocks with a lexicon-based sentiment label

use super::Stage;
use crate::pipeline::PipelineError;
use crate::state::{DocumentState, Narrative, Sentiment};
use tracing::info;

const POSITIVE_WORDS: &[&str] = &[
    "growth",
    "increase",
    "improvement",
    "success",
    "strong",
    "opportunity",
];

const NEGATIVE_WORDS: &[&str] = &["decline", "decrease", "risk", "challenge", "threat", "loss"];

/// Sections need more than this many chars of content to count as prose.
const MIN_SECTION_CHARS: usize = 20;
/// Page-level fallback threshold.
const MIN_PAGE_CHARS: usize = 100;

/// Builds narrative blocks from sections, falling back to whole pages when no
/// section qualifies.
#[derive(Debug, Default)]
pub struct NarrativeStage;

impl NarrativeStage {
    pub fn new() -> Self {
        Self
    }
}

/// Compare how many lexicon words occur (each counted once) in the content.
pub(crate) fn classify_sentiment(content: &str) -> Sentiment {
    let lowered = content.to_lowercase();
    let count = |words: &[&str]| words.iter().filter(|w| lowered.contains(**w)).count();
    let positive = count(POSITIVE_WORDS);
    let negative = count(NEGATIVE_WORDS);

    if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

impl Stage for NarrativeStage {
    fn id(&self) -> &str {
        "narrative"
    }

    fn name(&self) -> &str {
        "Narrative Extraction"
    }

    fn apply(&self, mut state: DocumentState) -> Result<DocumentState, PipelineError> {
        let mut narratives: Vec<Narrative> = state
            .sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.content.chars().count() > MIN_SECTION_CHARS)
            .map(|(i, s)| Narrative {
                section_id: format!("section_{}", i),
                content: s.content.clone(),
                page_number: s.page_number,
                word_count: s.content.split_whitespace().count(),
                sentiment: classify_sentiment(&s.content),
            })
            .collect();

        let from_pages = narratives.is_empty();
        if from_pages {
            narratives = state
                .pages
                .iter()
                .filter(|p| p.text.chars().count() > MIN_PAGE_CHARS)
                .map(|p| Narrative {
                    section_id: format!("page_{}", p.page_number),
                    content: p.text.clone(),
                    page_number: p.page_number,
                    word_count: p.text.split_whitespace().count(),
                    sentiment: Sentiment::Neutral,
                })
                .collect();
        }

        state.narratives = narratives;
        info!(
            narratives = state.narratives.len(),
            from_pages, "extracted narrative blocks"
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Page, Section};

    fn section(i: u32, content: &str) -> Section {
        Section {
            page_number: i,
            heading: format!("HEADING {}", i),
            content: content.to_string(),
            depth: 1,
        }
    }

    #[test]
    fn sentiment_compares_lexicon_hits() {
        assert_eq!(
            classify_sentiment("Strong growth and a clear opportunity"),
            Sentiment::Positive
        );
        assert_eq!(
            classify_sentiment("Revenue decline amid supply risk"),
            Sentiment::Negative
        );
        assert_eq!(
            classify_sentiment("growth offset by a loss"),
            Sentiment::Neutral
        );
        assert_eq!(classify_sentiment("nothing notable"), Sentiment::Neutral);
    }

    #[test]
    fn repeated_words_count_once() {
        // three mentions of "loss" still count as one negative word
        assert_eq!(
            classify_sentiment("loss loss loss, growth and success"),
            Sentiment::Positive
        );
    }

    #[test]
    fn short_sections_are_skipped_but_keep_their_index() {
        let mut state = DocumentState::default();
        state.sections = vec![
            section(1, "too short"),
            section(1, "This section is long enough to count as prose."),
        ];

        let state = NarrativeStage::new().apply(state).unwrap();
        assert_eq!(state.narratives.len(), 1);
        assert_eq!(state.narratives[0].section_id, "section_1");
        assert_eq!(state.narratives[0].word_count, 9);
    }

    #[test]
    fn falls_back_to_long_pages_when_no_sections() {
        let long = "word ".repeat(30);
        let state = DocumentState::from_pages(vec![
            Page::new(1, "short page"),
            Page::new(2, long.clone()),
        ]);

        let state = NarrativeStage::new().apply(state).unwrap();
        assert_eq!(state.narratives.len(), 1);
        let block = &state.narratives[0];
        assert_eq!(block.section_id, "page_2");
        assert_eq!(block.word_count, 30);
        assert_eq!(block.sentiment, Sentiment::Neutral);
        assert_eq!(block.content, long);
    }

    #[test]
    fn fallback_sentiment_is_forced_neutral() {
        let text = "Strong growth and success everywhere. ".repeat(4);
        let state = NarrativeStage::new()
            .apply(DocumentState::from_pages(vec![Page::new(1, text)]))
            .unwrap();
        assert_eq!(state.narratives[0].sentiment, Sentiment::Neutral);
    }

    #[test]
    fn empty_state_yields_no_narratives() {
        let state = NarrativeStage::new().apply(DocumentState::default()).unwrap();
        assert!(state.narratives.is_empty());
    }
}
