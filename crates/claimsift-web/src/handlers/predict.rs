use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

use claimsift_core::{PredictError, annotate, model_color};

use crate::models::{PredictRequest, PredictResponse, SentenceJson, SpanJson};
use crate::state::AppState;

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Text is required" })),
        )
            .into_response();
    }

    // Model names arrive uppercase from the UI selector.
    let model = req.model.to_lowercase();

    let predictor = state.predictor.clone();
    let text = req.text;
    let outcome = {
        let model = model.clone();
        tokio::task::spawn_blocking(move || predictor.predict(&model, &text)).await
    };

    let results = match outcome {
        Ok(Ok(results)) => results,
        Ok(Err(e @ (PredictError::NotLoaded | PredictError::UnknownModel(_)))) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        }
        Ok(Err(e)) => {
            tracing::error!(model, error = %e, "prediction failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "prediction task panicked");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "internal error" })),
            )
                .into_response();
        }
    };

    let color = model_color(&model);
    let spans = annotate(&results, color);

    tracing::debug!(model, sentences = results.len(), "prediction complete");

    Json(PredictResponse {
        model,
        color: color.to_string(),
        results: results.iter().map(SentenceJson::from).collect(),
        spans: spans.iter().map(SpanJson::from).collect(),
    })
    .into_response()
}
