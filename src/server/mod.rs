//! HTTP server for the tutor service

pub mod routes;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::BuddyConfig;
use crate::error::{Error, Result};
use crate::retrieval::VectorStore;
use state::AppState;

/// Tutor HTTP server
pub struct BuddyServer {
    state: AppState,
}

impl BuddyServer {
    /// Create a new server with providers wired from configuration
    pub fn new(config: BuddyConfig) -> Result<Self> {
        let state = AppState::new(config)?;
        Ok(Self { state })
    }

    /// Get the shared application state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        router(self.state.clone())
    }

    /// Load the persisted knowledge base and make the state ready.
    ///
    /// Runs to completion before the listener binds; a request that arrives
    /// earlier is rejected by the readiness gate in the handler.
    pub fn load_knowledge_base(&self) -> Result<()> {
        let store_dir = self.state.config().corpus.store_dir.clone();
        tracing::info!("Loading knowledge base from {}", store_dir.display());

        let store = VectorStore::load(&store_dir)?;
        tracing::info!("Knowledge base loaded ({} chunks)", store.len());

        self.state.install_store(store);
        Ok(())
    }

    /// Two-phase startup: load the knowledge base, then bind and serve.
    pub async fn start(self) -> Result<()> {
        self.load_knowledge_base()?;

        let config = self.state.config();
        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();

        tracing::info!("Starting Bridge Buddy server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        let config = self.state.config();
        format!("{}:{}", config.server.host, config.server.port)
    }
}

/// Build the application router around shared state
pub(crate) fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public_dir = state.config().server.public_dir.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .route("/ask-buddy", post(routes::ask_buddy))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
async fn readiness(state: axum::extract::State<AppState>) -> axum::http::StatusCode {
    if state.is_ready() {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    }
}
