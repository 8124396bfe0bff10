//! Claim classification engine for scientific text.
//!
//! Splits paragraphs into sentences, runs them through pluggable
//! classification backends, and turns the per-sentence scores into
//! highlight spans. Also owns the content cache for extracted PDFs and
//! the reshaping of GROBID output into a flat section list.

use thiserror::Error;

pub mod cache;
pub mod config_file;
pub mod extract;
pub mod highlight;
pub mod predictor;
pub mod segment;

// Re-export for convenience
pub use cache::{ContentCache, content_hash};
pub use extract::{
    ContentSource, ExtractError, GrobidSource, SectionFetch, error_sections, fetch_sections,
    sections_from_article,
};
pub use highlight::{DEFAULT_COLOR, Span, annotate, model_color};
pub use predictor::{ClassifierBackend, Predictor};
pub use segment::split_sentences;

/// Names of the bundled claim classification models.
pub const MODEL_NAMES: [&str; 3] = ["claim2", "claim3a", "claim3b"];

/// Claim-score threshold: sentences scoring below this render plain,
/// everything else is highlighted as a claim.
pub const CLAIM_THRESHOLD: f32 = 0.5;

/// Score assigned to one class label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

/// Classification outcome for a single sentence: one score per class
/// label, ordered by the model's label index.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub sentence: String,
    pub scores: Vec<LabelScore>,
}

impl PredictionResult {
    /// The claim probability: the score of the label at index 1.
    /// `None` when the model has fewer than two labels.
    pub fn claim_score(&self) -> Option<f32> {
        self.scores.get(1).map(|s| s.score)
    }
}

/// What a section represents within the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Abstract,
    Paragraph,
}

impl SectionKind {
    /// Lowercase name as shown in the UI ("abstract" / "paragraph").
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Abstract => "abstract",
            SectionKind::Paragraph => "paragraph",
        }
    }
}

/// A flat content section extracted from a PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfSection {
    pub id: usize,
    pub kind: SectionKind,
    pub title: String,
    pub text: String,
}

/// Failure modes of a classification backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("tokenization failed: {0}")]
    Tokenize(String),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("unexpected model output: {0}")]
    Output(String),
}

/// Why a prediction request was rejected.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("no models are loaded")]
    NotLoaded,
    #[error("unknown model: {0}")]
    UnknownModel(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_score_reads_second_label() {
        let result = PredictionResult {
            sentence: "We show X.".to_string(),
            scores: vec![
                LabelScore {
                    label: "LABEL_0".to_string(),
                    score: 0.3,
                },
                LabelScore {
                    label: "LABEL_1".to_string(),
                    score: 0.7,
                },
            ],
        };
        assert_eq!(result.claim_score(), Some(0.7));
    }

    #[test]
    fn claim_score_none_for_single_label() {
        let result = PredictionResult {
            sentence: "Hmm.".to_string(),
            scores: vec![LabelScore {
                label: "LABEL_0".to_string(),
                score: 1.0,
            }],
        };
        assert_eq!(result.claim_score(), None);
    }

    #[test]
    fn section_kind_names() {
        assert_eq!(SectionKind::Abstract.as_str(), "abstract");
        assert_eq!(SectionKind::Paragraph.as_str(), "paragraph");
    }
}
