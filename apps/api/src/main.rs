mod config;
mod embedding;
mod errors;
mod interview;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::embedding::cache::EmbeddingCache;
use crate::embedding::RemoteEmbeddingClient;
use crate::interview::session::InterviewEngine;
use crate::llm_client::HttpCompletionClient;
use crate::routes::build_router;
use crate::state::AppState;

/// Model identifier reported for remote embeddings.
const EMBEDDING_MODEL: &str = "titan-embed-text-v2";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Completion backend: absence is surfaced per call, not at boot
    let completion = HttpCompletionClient::new(
        config.completion_endpoint.clone(),
        config.completion_api_key.clone(),
    );
    if completion.is_configured() {
        info!("completion client initialized");
    } else {
        warn!("completion backend not configured; interview calls will fail until it is");
    }

    // Embedding backend: degrades to the deterministic fallback when absent
    let embedding = RemoteEmbeddingClient::new(
        config.embedding_endpoint.clone(),
        config.embedding_api_key.clone(),
        EMBEDDING_MODEL.to_string(),
    );
    if config.embedding_endpoint.is_some() {
        info!("embedding client initialized (model: {EMBEDDING_MODEL})");
    } else {
        info!("embedding backend not configured; using deterministic fallback vectors");
    }

    let engine = Arc::new(InterviewEngine::new(
        Arc::new(completion),
        Arc::new(embedding),
        Arc::new(EmbeddingCache::new()),
    ));

    let state = AppState {
        engine,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
