use std::sync::Arc;

use claimsift_core::{ContentCache, ContentSource, Predictor};

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub cache: ContentCache,
    pub source: Arc<dyn ContentSource>,
}
