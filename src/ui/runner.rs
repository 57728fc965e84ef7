//! Server assembly: configuration, routing, background tasks, serving.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    domain::{
        CallQueueRepository,
        entity::{DEFAULT_COLLAB_REQUEST_TTL_MS, DEFAULT_DISCONNECT_GRACE_MS},
    },
    infrastructure::{collab::CollabRooms, repository::InMemoryCallQueueRepository},
    usecase::{ChatUseCase, EvictStaleUseCase},
};

use super::{broadcast::broadcast_queue_update, handler, signal, state::AppState};

/// Janitor wake-up interval
const JANITOR_INTERVAL_SECS: u64 = 30;

/// Startup configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// LLM provider API key (None = chat assistant disabled)
    pub anthropic_api_key: Option<String>,
}

impl ServerConfig {
    /// Read configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        let anthropic_api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        Self {
            host,
            port,
            anthropic_api_key,
        }
    }
}

/// Run the server with environment configuration
pub async fn run_server() -> std::io::Result<()> {
    run_with_config(ServerConfig::from_env()).await
}

/// Run the server with explicit configuration
pub async fn run_with_config(config: ServerConfig) -> std::io::Result<()> {
    let repository: Arc<dyn CallQueueRepository> = Arc::new(InMemoryCallQueueRepository::new());
    let state = Arc::new(AppState {
        repository,
        collab_rooms: CollabRooms::new(),
        chat: ChatUseCase::new(config.anthropic_api_key.clone()),
    });

    tokio::spawn(janitor_loop(state.clone()));

    let app = Router::new()
        .route("/api/health", get(handler::http::health_check))
        .route("/api/cars", get(handler::http::get_cars))
        .route("/api/chat", post(handler::http::post_chat))
        .route("/api/ws/call", get(handler::call::call_handler))
        .route("/api/ws/calls/monitor", get(handler::monitor::monitor_handler))
        .route(
            "/api/ws/collaboration/{shopper_id}",
            get(handler::collaboration::collaboration_handler),
        )
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Coordination server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(signal::shutdown_signal())
        .await
}

/// Periodic janitor: evict shoppers disconnected past the grace window and
/// drop expired pending collaboration requests. One broadcast per sweep that
/// changed the observable queue.
async fn janitor_loop(state: Arc<AppState>) {
    let usecase = EvictStaleUseCase::new(state.repository.clone());
    let mut interval = tokio::time::interval(Duration::from_secs(JANITOR_INTERVAL_SECS));
    // the first tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;
        let outcome = usecase
            .execute(DEFAULT_DISCONNECT_GRACE_MS, DEFAULT_COLLAB_REQUEST_TTL_MS)
            .await;

        if outcome.queue_changed() {
            tracing::info!(
                "Janitor evicted {} stale shopper entries",
                outcome.evicted.len()
            );
            broadcast_queue_update(&state).await;
        }
        if outcome.expired_requests > 0 {
            tracing::debug!(
                "Janitor dropped {} expired collaboration requests",
                outcome.expired_requests
            );
        }
    }
}
