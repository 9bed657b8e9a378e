//! Application state shared across handlers.

use std::sync::Arc;

use curriculum::CurriculumGenerator;
use database::Database;
use ingest::GitHubFetcher;

use crate::session::SessionStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Curriculum and guidance generation.
    pub generator: CurriculumGenerator,
    /// GitHub repository analysis.
    pub github: Arc<GitHubFetcher>,
    /// Live sessions.
    pub sessions: SessionStore,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        db: Database,
        generator: CurriculumGenerator,
        github: GitHubFetcher,
        sessions: SessionStore,
    ) -> Self {
        Self {
            db,
            generator,
            github: Arc::new(github),
            sessions,
        }
    }
}
