use std::sync::Arc;

use crate::config::Config;
use crate::interview::session::InterviewEngine;

/// Shared application state injected into all route handlers via Axum
/// extractors. The engine holds the injected completion/embedding backends
/// and the per-session embedding cache.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<InterviewEngine>,
    pub config: Config,
}
