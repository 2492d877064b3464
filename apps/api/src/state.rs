use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::CompletionModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// `LlmClient` in production; tests swap in a scripted model.
    pub llm: Arc<dyn CompletionModel>,
    pub config: Config,
}
