use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::scoring::ResumeScorer;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything in here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Scorer for the configured mode, wrapping the loaded model.
    pub scorer: Arc<dyn ResumeScorer>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config, scorer: Arc<dyn ResumeScorer>) -> Self {
        Self {
            config,
            scorer,
            started_at: Utc::now(),
        }
    }
}
