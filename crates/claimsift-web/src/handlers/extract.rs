use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

use claimsift_core::{content_hash, error_sections, fetch_sections};

use crate::models::{ExtractResponse, SectionJson};
use crate::state::AppState;
use crate::upload;

pub async fn extract(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> impl IntoResponse {
    let file = match upload::parse_multipart(multipart).await {
        Ok(file) => file,
        Err(msg) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": msg })),
            )
                .into_response();
        }
    };

    tracing::info!(filename = %file.filename, bytes = file.data.len(), "processing upload");

    match fetch_sections(state.source.as_ref(), &state.cache, &file.data).await {
        Ok(fetch) => {
            let sections: Vec<SectionJson> =
                fetch.sections.iter().map(SectionJson::from).collect();
            Json(ExtractResponse {
                filename: file.filename,
                hash: fetch.hash,
                cached: fetch.from_cache,
                error: None,
                sections,
            })
            .into_response()
        }
        Err(e) => {
            // Parse failures still answer 200 with the placeholder section,
            // so the page can render something for the upload.
            tracing::warn!(filename = %file.filename, error = %e, "extraction failed");
            let sections: Vec<SectionJson> =
                error_sections().iter().map(SectionJson::from).collect();
            Json(ExtractResponse {
                filename: file.filename,
                hash: content_hash(&file.data),
                cached: false,
                error: Some(e.to_string()),
                sections,
            })
            .into_response()
        }
    }
}
