use std::sync::Arc;

use crate::careers::pipeline::CareerPipeline;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Built once at startup; holds the embedded skill vocabulary.
    pub pipeline: Arc<CareerPipeline>,
}
