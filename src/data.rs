// src/data.rs
//
// Records that flow between the tools:
//
// - PoemRow: one listing row, as scraped (poems.csv).
// - Candidate: a poem scored for typing load (shortlist step).
// - ShortlistRow: one line of shortlist_candidates.csv.
// - ParagraphMetrics: per-paragraph statistics (compare step).

use serde::{Deserialize, Serialize};

/// One row of the listing table. Written once to the CSV sink, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemRow {
    pub title: String,
    pub link: String,
    pub lines: u64,
    pub views: u64,
    pub source_page: u32,
}

impl PoemRow {
    /// Cells in `POEM_COLUMNS` order.
    pub fn to_record(&self) -> [String; 5] {
        [
            self.title.clone(),
            self.link.clone(),
            self.lines.to_string(),
            self.views.to_string(),
            self.source_page.to_string(),
        ]
    }
}

/// A poem fetched and scored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub link: String,
    pub lines: u64,
    pub views: u64,
    pub typed_chars: usize,
    pub words: usize,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortlistRow {
    pub band: String,
    pub title: String,
    pub link: String,
    pub lines: u64,
    pub views: u64,
    pub typed_chars: usize,
    pub words: usize,
    pub sample_text: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParagraphMetrics {
    pub dataset: String,
    /// 1-based position in the file
    pub index: usize,
    pub raw_chars: usize,
    pub typed_chars: usize,
    pub words: usize,
    pub unique_words: usize,
    pub avg_word_len: f64,
    pub punctuation_removed: usize,
    pub punctuation_ratio: f64,
}
