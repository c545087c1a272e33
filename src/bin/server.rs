//! Serving binary: loads the knowledge base, then answers questions over HTTP
//!
//! Run with: cargo run --bin buddy-server

use bridge_buddy::{config::BuddyConfig, server::BuddyServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bridge_buddy=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BuddyConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Store dir: {}", config.corpus.store_dir.display());
    tracing::info!("  - Public dir: {}", config.server.public_dir.display());
    tracing::info!("  - Generation model: {}", config.gemini.generate_model);
    tracing::info!("  - Retrieval top-k: {}", config.retrieval.top_k);

    let server = BuddyServer::new(config)?;

    match server.state().llm().health_check().await {
        Ok(true) => tracing::info!("Gemini API is reachable"),
        _ => tracing::warn!("Gemini API is not reachable; requests may fail"),
    }

    println!("\nBridge Buddy starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /ask-buddy - Ask a question");
    println!("  GET  /ready     - Readiness check");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
