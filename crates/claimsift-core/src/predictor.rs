//! Model registry and prediction facade.
//!
//! A [`Predictor`] maps model names to [`ClassifierBackend`] instances and
//! turns a free-text paragraph into per-sentence [`PredictionResult`]s. The
//! registry is populated once at startup and shared immutably afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use crate::segment::split_sentences;
use crate::{BackendError, PredictError, PredictionResult};

/// A text classification backend that scores batches of sentences.
///
/// Implementors receive the full sentence batch in one call and return one
/// score vector per input text, ordered by the model's label index.
pub trait ClassifierBackend: Send + Sync {
    fn classify_batch(&self, texts: &[&str]) -> Result<Vec<Vec<crate::LabelScore>>, BackendError>;
}

/// Registry of claim classifiers, keyed by model name.
pub struct Predictor {
    models: HashMap<String, Arc<dyn ClassifierBackend>>,
}

impl Predictor {
    /// Create an empty registry. Predictions fail with
    /// [`PredictError::NotLoaded`] until at least one model is registered.
    pub fn new() -> Self {
        Self {
            models: HashMap::new(),
        }
    }

    /// Register a backend under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, backend: Arc<dyn ClassifierBackend>) {
        self.models.insert(name.into(), backend);
    }

    /// Whether `name` is a registered model.
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Registered model names, sorted.
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether the registry has no models.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Classify every sentence of `paragraph` with the named model.
    ///
    /// The paragraph is split into sentences and the whole batch is passed
    /// to the backend in a single call; the output always has exactly one
    /// entry per sentence, in input order. An empty paragraph yields an
    /// empty result without touching the backend.
    pub fn predict(
        &self,
        model_name: &str,
        paragraph: &str,
    ) -> Result<Vec<PredictionResult>, PredictError> {
        if self.models.is_empty() {
            return Err(PredictError::NotLoaded);
        }
        let backend = self
            .models
            .get(model_name)
            .ok_or_else(|| PredictError::UnknownModel(model_name.to_string()))?;

        let sentences = split_sentences(paragraph);
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = sentences.iter().map(String::as_str).collect();
        let scores = backend.classify_batch(&texts)?;
        if scores.len() != sentences.len() {
            return Err(BackendError::Output(format!(
                "expected {} score vectors, got {}",
                sentences.len(),
                scores.len()
            ))
            .into());
        }

        tracing::debug!(
            model = model_name,
            sentences = sentences.len(),
            "classified paragraph"
        );

        Ok(sentences
            .into_iter()
            .zip(scores)
            .map(|(sentence, scores)| PredictionResult { sentence, scores })
            .collect())
    }
}

impl Default for Predictor {
    fn default() -> Self {
        Self::new()
    }
}
