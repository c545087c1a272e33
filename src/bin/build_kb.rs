//! Offline knowledge-base build job
//!
//! Run with: cargo run --bin build-kb

use std::sync::Arc;

use bridge_buddy::config::BuddyConfig;
use bridge_buddy::ingestion::{BuildOutcome, CorpusLoader, IndexBuilder, TextChunker};
use bridge_buddy::providers::{EmbeddingProvider, GeminiEmbedder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bridge_buddy=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BuddyConfig::load()?;

    tracing::info!("Starting knowledge base build");
    tracing::info!("  - Source dir: {}", config.corpus.source_dir.display());
    tracing::info!("  - Store dir: {}", config.corpus.store_dir.display());
    tracing::info!("  - Batch size: {}", config.indexing.batch_size);
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(GeminiEmbedder::new(&config.gemini)?);

    match embedder.health_check().await {
        Ok(true) => tracing::info!("Embedding provider is reachable"),
        _ => tracing::warn!("Embedding provider is not reachable; the build may fail"),
    }

    let documents = CorpusLoader::load_dir(&config.corpus.source_dir)?;
    tracing::info!(
        "Loaded {} documents from {}",
        documents.len(),
        config.corpus.source_dir.display()
    );

    let chunker = TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap);
    let builder = IndexBuilder::new(
        chunker,
        embedder,
        config.indexing.batch_size,
        config.indexing.batch_delay(),
    );

    match builder.build(&documents, &config.corpus.store_dir).await? {
        BuildOutcome::EmptyCorpus => {
            tracing::warn!("No content to process; no index was written");
        }
        BuildOutcome::Built(report) => {
            tracing::info!(
                "Indexed {}/{} chunks in {} batches",
                report.chunks_indexed,
                report.chunks_total,
                report.batches_total
            );
            for skipped in &report.skipped_batches {
                tracing::warn!(
                    "Batch {} was skipped ({} chunks): {}",
                    skipped.ordinal,
                    skipped.chunks,
                    skipped.reason
                );
            }
            tracing::info!(
                "Knowledge base build complete: {}",
                config.corpus.store_dir.display()
            );
        }
    }

    Ok(())
}
