use anyhow::Result;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::{info, warn};

use story_api_server::config::Settings;
use story_api_server::database::{DbPool, MessageRepository};
use story_api_server::handlers;
use story_api_server::services::{
    DurableHistory, HistoryStore, RagClient, RagProvider, VolatileHistory,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,story_api_server=debug".to_string()),
        )
        .with_target(true)
        .json()
        .init();

    info!("🚀 Starting Story API Server...");

    // Load configuration (paid-tier credential missing -> startup fails here)
    let settings = Settings::load()?;
    info!("✅ Configuration loaded");
    info!(
        "Credentials loaded: free-tier key length {}, paid key length {}",
        settings.rag.free_tier_api_key.len(),
        settings.rag.paid_api_key.len()
    );

    let history = init_history(&settings).await;
    info!("✅ Chat history backend: {}", history.name());

    let rag: Arc<dyn RagProvider> = Arc::new(RagClient::new(settings.rag.clone()));

    let app = build_router(history, rag);

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Picks the history backend once for the process lifetime: durable when the
/// configured database is reachable, in-memory otherwise.
async fn init_history(settings: &Settings) -> Arc<dyn HistoryStore> {
    let Some(db_config) = &settings.database else {
        warn!("No database configured, chat history will not survive restarts");
        return Arc::new(VolatileHistory::new());
    };

    match DbPool::new(db_config).await {
        Ok(pool) => {
            let repository = Arc::new(MessageRepository::new(pool));
            match repository.ensure_schema().await {
                Ok(()) => Arc::new(DurableHistory::new(repository, settings.history.clone())),
                Err(e) => {
                    warn!(
                        "Failed to prepare chat history schema ({}), falling back to in-memory history",
                        e
                    );
                    Arc::new(VolatileHistory::new())
                }
            }
        }
        Err(e) => {
            warn!(
                "Database unreachable ({}), falling back to in-memory history",
                e
            );
            Arc::new(VolatileHistory::new())
        }
    }
}

fn build_router(history: Arc<dyn HistoryStore>, rag: Arc<dyn RagProvider>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check));

    let api_routes =
        Router::new().route("/query_roman_empire", post(handlers::query::query_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Shared state
        .layer(Extension(history))
        .layer(Extension(rag))
        // CORS
        .layer(
            CorsLayer::permissive()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Tracing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
}
