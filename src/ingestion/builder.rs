//! Incremental index construction in failure-isolated batches

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::retrieval::VectorStore;
use crate::types::{Chunk, Document};

use super::chunker::TextChunker;

/// Outcome of a build run
#[derive(Debug)]
pub enum BuildOutcome {
    /// The corpus produced no non-empty chunks; nothing was written
    EmptyCorpus,
    /// The index was built and persisted
    Built(BuildReport),
}

/// Countable record of what a build did
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Non-empty chunks found in the corpus
    pub chunks_total: usize,
    /// Chunks that made it into the persisted index
    pub chunks_indexed: usize,
    /// Number of batches after the seed
    pub batches_total: usize,
    /// Batches skipped whole because of a failure
    pub skipped_batches: Vec<SkippedBatch>,
}

/// A batch dropped from the index
#[derive(Debug, Clone)]
pub struct SkippedBatch {
    /// 1-based batch ordinal
    pub ordinal: usize,
    /// Chunks lost with the batch
    pub chunks: usize,
    /// Why the batch failed
    pub reason: String,
}

/// Builds the vector store from a document corpus.
///
/// The first chunk seeds the store synchronously; the remaining chunks are
/// folded in as fixed-size batches in strict sequential order, with a pause
/// between batches for the rate-limited embedding provider. A failed batch
/// is skipped whole and recorded; seed and final-save failures are fatal.
pub struct IndexBuilder {
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    batch_delay: Duration,
}

impl IndexBuilder {
    /// Create a new builder
    pub fn new(
        chunker: TextChunker,
        embedder: Arc<dyn EmbeddingProvider>,
        batch_size: usize,
        batch_delay: Duration,
    ) -> Self {
        Self {
            chunker,
            embedder,
            batch_size: batch_size.max(1),
            batch_delay,
        }
    }

    /// Build and persist the index from `documents`.
    pub async fn build(&self, documents: &[Document], store_dir: &Path) -> Result<BuildOutcome> {
        let chunks = self.chunker.split_documents(documents);
        if chunks.is_empty() {
            tracing::warn!("No non-empty chunks found in corpus; halting build");
            return Ok(BuildOutcome::EmptyCorpus);
        }
        tracing::info!("{} non-empty chunks to process", chunks.len());

        let mut store = self.seed(&chunks[0]).await?;
        tracing::info!("Vector store seeded");

        let remaining = &chunks[1..];
        let batches_total = remaining.len().div_ceil(self.batch_size);
        let mut report = BuildReport {
            chunks_total: chunks.len(),
            chunks_indexed: 1,
            batches_total,
            skipped_batches: Vec::new(),
        };

        for (index, batch) in remaining.chunks(self.batch_size).enumerate() {
            let ordinal = index + 1;
            tracing::info!("Processing batch {}/{}", ordinal, batches_total);

            match self.insert_batch(&mut store, batch).await {
                Ok(()) => report.chunks_indexed += batch.len(),
                Err(e) => {
                    tracing::warn!(
                        "Batch {} failed and was skipped ({} chunks): {}",
                        ordinal,
                        batch.len(),
                        e
                    );
                    report.skipped_batches.push(SkippedBatch {
                        ordinal,
                        chunks: batch.len(),
                        reason: e.to_string(),
                    });
                }
            }

            // pacing for the rate-limited embedding provider
            tokio::time::sleep(self.batch_delay).await;
        }

        store.save(store_dir)?;
        tracing::info!(
            "Vector store persisted to {} ({} chunks)",
            store_dir.display(),
            store.len()
        );

        Ok(BuildOutcome::Built(report))
    }

    /// Seed the store from the first chunk. There is no index to batch into
    /// until this succeeds.
    async fn seed(&self, chunk: &Chunk) -> Result<VectorStore> {
        let embedding = self.embedder.embed(&chunk.text).await?;
        VectorStore::from_seed(
            chunk.text.clone(),
            chunk.source_path.display().to_string(),
            embedding,
        )
    }

    /// Embed and insert one batch. Embeddings are fetched and validated
    /// before any insert, so a failure loses exactly this batch.
    async fn insert_batch(&self, store: &mut VectorStore, batch: &[Chunk]) -> Result<()> {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != batch.len() {
            return Err(Error::Embedding(format!(
                "provider returned {} embeddings for {} chunks",
                embeddings.len(),
                batch.len()
            )));
        }
        if let Some(bad) = embeddings
            .iter()
            .position(|e| e.len() != store.dimensions())
        {
            return Err(Error::Embedding(format!(
                "embedding {} has {} dimensions, index expects {}",
                bad,
                embeddings[bad].len(),
                store.dimensions()
            )));
        }

        for (chunk, embedding) in batch.iter().zip(embeddings) {
            store.insert(
                chunk.text.clone(),
                chunk.source_path.display().to_string(),
                embedding,
            )?;
        }
        Ok(())
    }
}
