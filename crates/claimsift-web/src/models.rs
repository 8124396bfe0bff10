use claimsift_core::{PdfSection, PredictionResult, Span};
use serde::{Deserialize, Serialize};

// ── Predict DTOs ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub model: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreJson {
    pub label: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentenceJson {
    pub sentence: String,
    pub scores: Vec<ScoreJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_score: Option<f32>,
}

impl From<&PredictionResult> for SentenceJson {
    fn from(r: &PredictionResult) -> Self {
        SentenceJson {
            sentence: r.sentence.clone(),
            scores: r
                .scores
                .iter()
                .map(|s| ScoreJson {
                    label: s.label.clone(),
                    score: s.score,
                })
                .collect(),
            claim_score: r.claim_score(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SpanJson {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl From<&Span> for SpanJson {
    fn from(s: &Span) -> Self {
        SpanJson {
            text: s.text.clone(),
            label: s.label.clone(),
            color: s.color.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub model: String,
    pub color: String,
    pub results: Vec<SentenceJson>,
    pub spans: Vec<SpanJson>,
}

// ── Extract DTOs ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SectionJson {
    pub id: usize,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub text: String,
}

impl From<&PdfSection> for SectionJson {
    fn from(s: &PdfSection) -> Self {
        SectionJson {
            id: s.id,
            kind: s.kind.as_str().to_string(),
            title: s.title.clone(),
            text: s.text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractResponse {
    pub filename: String,
    pub hash: String,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub sections: Vec<SectionJson>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimsift_core::{LabelScore, SectionKind};

    #[test]
    fn section_json_uses_type_key() {
        let section = PdfSection {
            id: 0,
            kind: SectionKind::Abstract,
            title: "Abstract".to_string(),
            text: "Text.".to_string(),
        };
        let value = serde_json::to_value(SectionJson::from(&section)).unwrap();
        assert_eq!(value["type"], "abstract");
        assert_eq!(value["id"], 0);
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn plain_span_omits_label_and_color() {
        let span = Span {
            text: "Just text.".to_string(),
            label: None,
            color: None,
        };
        let value = serde_json::to_value(SpanJson::from(&span)).unwrap();
        assert!(value.get("label").is_none());
        assert!(value.get("color").is_none());
    }

    #[test]
    fn sentence_json_carries_claim_score() {
        let result = PredictionResult {
            sentence: "We claim this.".to_string(),
            scores: vec![
                LabelScore {
                    label: "LABEL_0".to_string(),
                    score: 0.2,
                },
                LabelScore {
                    label: "LABEL_1".to_string(),
                    score: 0.8,
                },
            ],
        };
        let value = serde_json::to_value(SentenceJson::from(&result)).unwrap();
        assert_eq!(value["claim_score"], serde_json::json!(0.8f32));
        assert_eq!(value["scores"][1]["label"], "LABEL_1");
    }

    #[test]
    fn error_field_omitted_on_success() {
        let response = ExtractResponse {
            filename: "paper.pdf".to_string(),
            hash: "abc".to_string(),
            cached: true,
            error: None,
            sections: Vec::new(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["cached"], true);
    }
}
