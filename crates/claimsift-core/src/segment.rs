//! Sentence splitting for classifier input.
//!
//! Segmentation itself is delegated to the UAX #29 sentence boundary rules
//! in [`unicode_segmentation`]; this module only trims the segments and
//! drops empty ones.

use unicode_segmentation::UnicodeSegmentation;

/// Split a paragraph into sentences.
///
/// Returns an empty list for empty or whitespace-only input.
pub fn split_sentences(paragraph: &str) -> Vec<String> {
    paragraph
        .split_sentence_bounds()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
