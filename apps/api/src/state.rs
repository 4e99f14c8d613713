use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::orchestrator::Orchestrator;
use crate::pipeline::tracker::FileTracker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Built once at startup with every collaborator client injected.
    pub orchestrator: Arc<Orchestrator>,
    /// Same tracker the orchestrator writes to; the upload route adds the
    /// intake record.
    pub tracker: Arc<FileTracker>,
}
