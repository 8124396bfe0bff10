//! ONNX Runtime backend for the claim classifiers.
//!
//! Each bundled model is a transformer sequence classifier exported to
//! ONNX, shipped alongside its HuggingFace `tokenizer.json` and
//! `config.json`. [`TextClassifier`] wires the three together: tokenize
//! a batch, run one forward pass, softmax the logits into per-label
//! probabilities. [`load_models`] loads every model name known to the
//! engine and hands back a ready [`Predictor`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use thiserror::Error;
use tokenizers::Tokenizer;

use ort::{
    inputs, session::Session, session::builder::GraphOptimizationLevel, value::Value,
};

use claimsift_core::{BackendError, ClassifierBackend, LabelScore, MODEL_NAMES, Predictor};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("model file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("failed to load tokenizer: {0}")]
    Tokenizer(String),
    #[error("failed to read model config: {0}")]
    Config(String),
    #[error("ONNX runtime error: {0}")]
    Ort(#[from] ort::Error),
}

/// The slice of HuggingFace `config.json` we care about.
#[derive(Debug, Deserialize)]
struct ModelConfig {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

impl ModelConfig {
    /// Labels sorted by their numeric index, so position 1 is the claim
    /// label for the two-class models.
    fn labels_in_order(&self) -> Vec<String> {
        let mut entries: Vec<(usize, &String)> = self
            .id2label
            .iter()
            .filter_map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v)))
            .collect();
        entries.sort_by_key(|(i, _)| *i);
        entries.into_iter().map(|(_, v)| v.clone()).collect()
    }
}

/// One loaded sequence classifier.
///
/// `Session::run` needs `&mut`, so the session sits behind a `Mutex`;
/// callers already batch all sentences of a paragraph into one call, so
/// the lock is held for exactly one forward pass.
pub struct TextClassifier {
    name: String,
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    needs_token_type_ids: bool,
}

impl TextClassifier {
    /// Load a classifier from `dir`, which must contain `model.onnx`,
    /// `tokenizer.json`, and `config.json`.
    pub fn load(name: impl Into<String>, dir: &Path) -> Result<Self, PipelineError> {
        let name = name.into();
        let model_path = dir.join("model.onnx");
        let tokenizer_path = dir.join("tokenizer.json");
        let config_path = dir.join("config.json");
        for path in [&model_path, &tokenizer_path, &config_path] {
            if !path.exists() {
                return Err(PipelineError::MissingFile(path.clone()));
            }
        }

        let config_text = std::fs::read_to_string(&config_path)
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        let config: ModelConfig =
            serde_json::from_str(&config_text).map_err(|e| PipelineError::Config(e.to_string()))?;
        let labels = config.labels_in_order();
        if labels.is_empty() {
            return Err(PipelineError::Config(format!(
                "no id2label mapping in {}",
                config_path.display()
            )));
        }

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| PipelineError::Tokenizer(e.to_string()))?;

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(&model_path)?;

        // BERT-style exports take token_type_ids, DistilBERT-style ones don't.
        let needs_token_type_ids = session
            .inputs
            .iter()
            .any(|input| input.name == "token_type_ids");

        tracing::info!(model = %name, labels = labels.len(), "loaded classifier");

        Ok(Self {
            name,
            session: Mutex::new(session),
            tokenizer,
            labels,
            needs_token_type_ids,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl ClassifierBackend for TextClassifier {
    fn classify_batch(&self, texts: &[&str]) -> Result<Vec<Vec<LabelScore>>, BackendError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| BackendError::Tokenize(e.to_string()))?;

        let batch = encodings.len();
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        // Pad every sequence to the longest in the batch. Id 0 is the pad
        // token for the bundled vocabularies; masked positions are ignored
        // by the model anyway.
        let mut input_ids = Vec::with_capacity(batch * max_len);
        let mut attention_mask = Vec::with_capacity(batch * max_len);
        for encoding in &encodings {
            let ids = encoding.get_ids();
            for i in 0..max_len {
                if i < ids.len() {
                    input_ids.push(ids[i] as i64);
                    attention_mask.push(1i64);
                } else {
                    input_ids.push(0i64);
                    attention_mask.push(0i64);
                }
            }
        }

        let input_ids = Value::from_array(([batch, max_len], input_ids.into_boxed_slice()))
            .map_err(|e| BackendError::Inference(e.to_string()))?;
        let attention_mask =
            Value::from_array(([batch, max_len], attention_mask.into_boxed_slice()))
                .map_err(|e| BackendError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| BackendError::Inference("model session poisoned".to_string()))?;
        let outputs = if self.needs_token_type_ids {
            // Single-segment input: all zeros.
            let token_type_ids = Value::from_array((
                [batch, max_len],
                vec![0i64; batch * max_len].into_boxed_slice(),
            ))
            .map_err(|e| BackendError::Inference(e.to_string()))?;
            session.run(inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
                "token_type_ids" => token_type_ids
            ])
        } else {
            session.run(inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask
            ])
        }
        .map_err(|e| BackendError::Inference(e.to_string()))?;

        let (shape, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| BackendError::Output(e.to_string()))?;
        if shape.len() != 2 || shape[0] as usize != batch {
            return Err(BackendError::Output(format!(
                "expected [{batch}, num_labels] logits, got shape {shape:?}"
            )));
        }
        let num_labels = shape[1] as usize;
        if num_labels != self.labels.len() {
            return Err(BackendError::Output(format!(
                "model emitted {num_labels} logits per text but config names {} labels",
                self.labels.len()
            )));
        }

        let results = logits
            .chunks(num_labels)
            .take(batch)
            .map(|row| {
                let probs = softmax(row);
                self.labels
                    .iter()
                    .zip(probs)
                    .map(|(label, score)| LabelScore {
                        label: label.clone(),
                        score,
                    })
                    .collect()
            })
            .collect();
        Ok(results)
    }
}

/// Numerically stable softmax over one row of logits.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Load every bundled classifier from `models_dir` into a [`Predictor`].
///
/// Each model lives in `<models_dir>/<name>/`. Loading is all-or-nothing:
/// a missing or broken model aborts startup rather than serving a partial
/// registry.
pub fn load_models(models_dir: &Path) -> Result<Predictor, PipelineError> {
    let mut predictor = Predictor::new();
    for name in MODEL_NAMES {
        let dir = models_dir.join(name);
        tracing::info!(model = name, dir = %dir.display(), "loading model");
        let classifier = TextClassifier::load(name, &dir)?;
        predictor.register(name, Arc::new(classifier));
    }
    Ok(predictor)
}
