//! Turning per-sentence predictions into displayable spans.
//!
//! A sentence whose claim score reaches [`CLAIM_THRESHOLD`](crate::CLAIM_THRESHOLD)
//! becomes a highlighted span carrying a percentage label and the model's
//! color; everything else passes through as plain text.

use crate::{CLAIM_THRESHOLD, PredictionResult};

/// Highlight color used when no model color applies.
pub const DEFAULT_COLOR: &str = "#8ef";

/// Highlight color associated with a classifier model.
pub fn model_color(model_name: &str) -> &'static str {
    match model_name {
        "claim2" => "#eab676",
        "claim3a" => "#abdbe3",
        "claim3b" => "#f9c8c8",
        _ => "#eab676",
    }
}

/// One run of text in the annotated output. Plain spans carry neither
/// label nor color.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub label: Option<String>,
    pub color: Option<String>,
}

impl Span {
    pub fn is_claim(&self) -> bool {
        self.label.is_some()
    }
}

/// Annotate prediction results as spans, highlighting claim sentences.
///
/// Spans come out in input order. A sentence with no claim score (for
/// example from a model with a single output label) is never highlighted.
pub fn annotate(results: &[PredictionResult], color: &str) -> Vec<Span> {
    results
        .iter()
        .map(|result| match result.claim_score() {
            Some(score) if score < CLAIM_THRESHOLD => plain(&result.sentence),
            Some(score) => Span {
                text: result.sentence.clone(),
                label: Some(format!("CLAIM {:.2}%", score * 100.0)),
                color: Some(color.to_string()),
            },
            None => plain(&result.sentence),
        })
        .collect()
}

fn plain(text: &str) -> Span {
    Span {
        text: text.to_string(),
        label: None,
        color: None,
    }
}
