//! Application state shared across HTTP handlers

use std::sync::Arc;

use crate::config::Config;
use crate::core::vision::VisionAnalyzer;

/// HTTP server state shared across handlers.
///
/// The analyzer is held behind the trait object so tests can wire in a
/// scripted fake instead of the OpenAI adapter.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// Vision collaborator used for every analysis call
    pub analyzer: Arc<dyn VisionAnalyzer>,
}

impl AppState {
    /// Create a new AppState with shared resources.
    pub fn new(config: Config, analyzer: Arc<dyn VisionAnalyzer>) -> Self {
        Self {
            config: Arc::new(config),
            analyzer,
        }
    }
}
