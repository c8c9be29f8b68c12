//! Application state for the web layer.

use std::path::Path;
use std::sync::Arc;

use crate::config::Settings;
use crate::dataset::QueryEngine;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Query engine over the process-wide table cache
    pub engine: QueryEngine,

    /// Settings read at start-up
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(engine: QueryEngine, settings: Settings) -> Self {
        Self {
            engine,
            settings: Arc::new(settings),
        }
    }

    /// The configured dataset path.
    pub fn csv_path(&self) -> &Path {
        &self.settings.csv_path
    }
}
