//! Application state for shared services

use std::sync::Arc;

use crate::domain::Cache;
use crate::infrastructure::services::GradesService;

/// Shared handles cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub grades_service: Arc<GradesService>,
    /// The same store the grades service writes to, pinged by `/ready`
    pub cache: Arc<dyn Cache>,
}

impl AppState {
    pub fn new(grades_service: Arc<GradesService>, cache: Arc<dyn Cache>) -> Self {
        Self {
            grades_service,
            cache,
        }
    }
}
