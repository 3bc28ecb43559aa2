use sqlx::SqlitePool;

use crate::llm_client::LlmClient;
use crate::notifications::NotificationQueue;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub llm: LlmClient,
    /// The same queue the provider client reports progress to.
    pub notifications: NotificationQueue,
}
