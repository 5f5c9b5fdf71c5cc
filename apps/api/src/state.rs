use std::sync::Arc;

use crate::interview::service::InterviewService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Session lifecycle operations. Backed by Postgres or the in-memory store.
    pub interviews: Arc<InterviewService>,
}
