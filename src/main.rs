//! Interview Coach - mock interview practice server
//!
//! Runs AI-led interviews for a chosen role, critiques answers as the
//! interview goes, and summarizes the whole transcript when it ends.

mod api;
mod config;
mod db;
mod interview;
mod llm;
mod prompts;

use api::{create_router, AppState};
use config::AppConfig;
use db::Database;
use llm::{LlmConfig, ModelRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "interview_coach=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env();

    // Initialize database
    let db = if config.in_memory() {
        tracing::info!("Using in-memory database");
        Database::open_in_memory()?
    } else {
        if let Some(dir) = config.db_dir() {
            std::fs::create_dir_all(dir)?;
        }
        tracing::info!(path = %config.db_path, "Opening database");
        Database::open(&config.db_path)?
    };

    // Initialize LLM registry
    let llm_config = LlmConfig::from_env();
    let llm_registry = Arc::new(ModelRegistry::new(&llm_config));

    if llm_registry.has_models() {
        tracing::info!(
            models = ?llm_registry.available_models(),
            interview_model = %llm_registry.interview_model_id(),
            analysis_model = %llm_registry.analysis_model_id(),
            "LLM registry initialized"
        );
    } else {
        tracing::warn!("No LLM API keys configured. Set GEMINI_API_KEY, OPENAI_API_KEY or LLM_GATEWAY.");
    }

    let state = AppState::new(db, llm_registry, config.service_timeout);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        timeout_secs = config.service_timeout.as_secs(),
        "Interview coach listening on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
