//! In-the-Loop API server. Proxies chat traffic to the LLM provider and the
//! graph backend.
//!
//! Two routes carry all the traffic:
//!
//! 1. `POST /api/chat` forwards a conversation to an OpenAI-compatible
//!    completion endpoint using the caller's API key.
//! 2. `POST /api/graph` starts or resumes a run on the graph backend and
//!    translates its `interrupt`/`final` replies into the client contract.
//!
//! Both are stateless; the only shared state is configuration and a pooled
//! HTTP client.

mod chat;
mod config;
mod error;
mod graph;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::config::AppConfig;

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// State shared across all Axum handlers.
struct AppState {
    /// Global configuration.
    config: AppConfig,
    /// Pooled client for provider and backend calls.
    http: reqwest::Client,
}

impl AppState {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

/// Build the application router.
fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat::chat_completion))
        .route("/api/graph", post(graph::graph_proxy))
        .route("/health", get(health))
        .with_state(state)
}

/// `GET /health`: liveness probe.
async fn health() -> &'static str {
    "ok"
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    info!(
        backend = %config.backend_url,
        provider = %config.provider_base_url,
        "upstreams configured"
    );

    let addr = format!("0.0.0.0:{}", config.listen_port);
    let app = router(Arc::new(AppState::new(config)));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(address = %addr, "api server listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
