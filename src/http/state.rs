//! Application state for the HTTP server.

use crate::db::repository::SeriesRepository;
use std::sync::Arc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for series queries
    pub repository: Arc<dyn SeriesRepository>,
}

impl AppState {
    /// Create a new application state with the given repository.
    pub fn new(repository: Arc<dyn SeriesRepository>) -> Self {
        Self { repository }
    }
}
