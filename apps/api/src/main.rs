mod config;
mod db;
mod document;
mod errors;
mod llm_client;
mod models;
mod notifications;
mod routes;
mod state;
mod store;
mod tailoring;
mod template;

use anyhow::Result;
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::notifications::NotificationQueue;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::activity::SqliteActivityLog;
use crate::store::prompts::initialize_prompts;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Architect API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite
    let db = create_pool(&config.database_url).await?;
    let seeded = initialize_prompts(&db).await?;
    info!("Prompt vault ready ({seeded} built-in prompts added)");

    // Provider client reports to the activity log and the notification queue
    let notifications = NotificationQueue::new(config.notification_ttl);
    let llm = LlmClient::new(
        config.endpoints.clone(),
        config.app_origin.clone(),
        config.provider_timeout,
        Arc::new(SqliteActivityLog::new(db.clone())),
        Arc::new(notifications.clone()),
    )?;
    info!(
        "LLM client initialized (timeout: {}s)",
        config.provider_timeout.as_secs()
    );

    let cors = CorsLayer::new()
        .allow_origin(config.app_origin.parse::<HeaderValue>()?)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        db,
        llm,
        notifications,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
