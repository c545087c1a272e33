//! Vector store over an HNSW index with a sidecar chunk table

use std::path::Path;

use hnsw_rs::prelude::{DistCosine, Hnsw};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const HNSW_MAX_CONNECTIONS: usize = 32;
const HNSW_MAX_LAYERS: usize = 16;
const HNSW_EF_CONSTRUCTION: usize = 200;
const HNSW_EF_SEARCH: usize = 100;
const DEFAULT_CAPACITY: usize = 100_000;

const STORE_FILE: &str = "index.json";

/// One retrievable entry: chunk text, provenance, and its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredChunk {
    text: String,
    source: String,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct StoreFileOut<'a> {
    dimensions: usize,
    chunks: &'a [StoredChunk],
}

#[derive(Deserialize)]
struct StoreFileIn {
    dimensions: usize,
    chunks: Vec<StoredChunk>,
}

/// Search result with chunk text and similarity
#[derive(Debug, Clone)]
pub struct Retrieved {
    /// The retrieved chunk text
    pub text: String,
    /// Provenance of the chunk
    pub source: String,
    /// Similarity score (higher is better)
    pub similarity: f32,
}

/// Vector store wrapping an HNSW index.
///
/// The on-disk layout is owned here and opaque to callers: `save` writes a
/// single file under the store directory, `load` reads it back and rebuilds
/// the in-memory index from the persisted embeddings.
pub struct VectorStore {
    hnsw: Hnsw<'static, f32, DistCosine>,
    entries: Vec<StoredChunk>,
    dimensions: usize,
}

impl VectorStore {
    /// Create an empty store for embeddings of the given dimension
    pub fn new(dimensions: usize) -> Self {
        Self::with_capacity(dimensions, DEFAULT_CAPACITY)
    }

    /// Construct a store from its first entry.
    ///
    /// The index needs at least one entry before incremental inserts make
    /// sense; the seed establishes the embedding dimension for everything
    /// that follows.
    pub fn from_seed(text: String, source: String, embedding: Vec<f32>) -> Result<Self> {
        if embedding.is_empty() {
            return Err(Error::index("seed embedding is empty"));
        }
        let mut store = Self::new(embedding.len());
        store.insert(text, source, embedding)?;
        Ok(store)
    }

    fn with_capacity(dimensions: usize, capacity: usize) -> Self {
        let hnsw = Hnsw::new(
            HNSW_MAX_CONNECTIONS,
            capacity.max(1),
            HNSW_MAX_LAYERS,
            HNSW_EF_CONSTRUCTION,
            DistCosine {},
        );
        Self {
            hnsw,
            entries: Vec::new(),
            dimensions,
        }
    }

    /// Insert a chunk with its embedding
    pub fn insert(&mut self, text: String, source: String, embedding: Vec<f32>) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(Error::Index(format!(
                "embedding has {} dimensions, index expects {}",
                embedding.len(),
                self.dimensions
            )));
        }

        let id = self.entries.len();
        self.hnsw.insert((&embedding, id));
        self.entries.push(StoredChunk {
            text,
            source,
            embedding,
        });
        Ok(())
    }

    /// Search for the `top_k` most similar chunks, best match first
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Retrieved>> {
        if query.len() != self.dimensions {
            return Err(Error::Index(format!(
                "query has {} dimensions, index expects {}",
                query.len(),
                self.dimensions
            )));
        }

        let neighbours = self.hnsw.search(query, top_k, HNSW_EF_SEARCH);

        let mut results: Vec<Retrieved> = neighbours
            .into_iter()
            .filter_map(|n| {
                self.entries.get(n.d_id).map(|entry| Retrieved {
                    text: entry.text.clone(),
                    source: entry.source.clone(),
                    // cosine distance to similarity
                    similarity: 1.0 - n.distance,
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    /// Number of stored chunks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimensions
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Persist the store under `dir` as a single save operation
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        let file = StoreFileOut {
            dimensions: self.dimensions,
            chunks: &self.entries,
        };
        let raw = serde_json::to_vec(&file)?;
        std::fs::write(dir.join(STORE_FILE), raw)?;
        Ok(())
    }

    /// Load a previously saved store from `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(STORE_FILE);
        let raw = std::fs::read(&path)
            .map_err(|e| Error::Index(format!("failed to read {}: {}", path.display(), e)))?;
        let file: StoreFileIn = serde_json::from_slice(&raw)?;

        let mut store = Self::with_capacity(file.dimensions, file.chunks.len());
        for chunk in file.chunks {
            store.insert(chunk.text, chunk.source, chunk.embedding)?;
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> VectorStore {
        let mut store = VectorStore::new(3);
        store
            .insert(
                "Dropped messages cause flicker".to_string(),
                "bridge.md".to_string(),
                vec![1.0, 0.0, 0.0],
            )
            .unwrap();
        store
            .insert(
                "Scenes are listed in the manifest".to_string(),
                "scenes.md".to_string(),
                vec![0.0, 1.0, 0.0],
            )
            .unwrap();
        store
            .insert(
                "Payloads are plain JSON".to_string(),
                "payload.md".to_string(),
                vec![0.0, 0.0, 1.0],
            )
            .unwrap();
        store
    }

    #[test]
    fn test_top_one_returns_nearest_chunk() {
        let store = sample_store();
        let results = store.search(&[0.95, 0.05, 0.0], 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "Dropped messages cause flicker");
        assert!(results[0].similarity > 0.9);
    }

    #[test]
    fn test_results_are_ordered_by_similarity() {
        let store = sample_store();
        let results = store.search(&[0.8, 0.6, 0.0], 3).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0].similarity >= results[1].similarity);
        assert!(results[1].similarity >= results[2].similarity);
        assert_eq!(results[0].text, "Dropped messages cause flicker");
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let mut store = sample_store();
        assert!(store
            .insert("bad".to_string(), "bad.md".to_string(), vec![1.0])
            .is_err());
        assert!(store.search(&[1.0], 1).is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = sample_store();
        store.save(dir.path()).unwrap();

        let loaded = VectorStore::load(dir.path()).unwrap();
        assert_eq!(loaded.len(), store.len());
        assert_eq!(loaded.dimensions(), 3);

        let results = loaded.search(&[0.0, 0.0, 1.0], 1).unwrap();
        assert_eq!(results[0].text, "Payloads are plain JSON");
        assert_eq!(results[0].source, "payload.md");
    }

    #[test]
    fn test_load_missing_store_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            VectorStore::load(dir.path()),
            Err(Error::Index(_))
        ));
    }

    #[test]
    fn test_seed_establishes_dimensions() {
        let store = VectorStore::from_seed(
            "seed".to_string(),
            "seed.md".to_string(),
            vec![0.5, 0.5],
        )
        .unwrap();
        assert_eq!(store.dimensions(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_empty_seed_embedding_is_rejected() {
        assert!(VectorStore::from_seed("seed".to_string(), "seed.md".to_string(), vec![]).is_err());
    }
}
