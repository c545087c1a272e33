//! Configuration for the tutor service

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuddyConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Corpus and store paths
    #[serde(default)]
    pub corpus: CorpusConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Index build configuration
    #[serde(default)]
    pub indexing: IndexingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Gemini API configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

impl BuddyConfig {
    /// Load configuration from a TOML file (if present) plus the environment.
    ///
    /// The file path comes from `BUDDY_CONFIG`, defaulting to `buddy.toml`.
    /// The API credential is only ever read from `GEMINI_API_KEY`.
    pub fn load() -> Result<Self> {
        let path = std::env::var("BUDDY_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("buddy.toml"));

        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            toml::from_str(&raw)
                .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))?
        } else {
            Self::default()
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.gemini.api_key = key;
        }
        if let Ok(port) = std::env::var("BUDDY_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(dir) = std::env::var("BUDDY_SOURCE_DIR") {
            self.corpus.source_dir = dir.into();
        }
        if let Ok(dir) = std::env::var("BUDDY_STORE_DIR") {
            self.corpus.store_dir = dir.into();
        }
    }

    /// Validate the configuration. A missing credential is startup-fatal.
    pub fn validate(&self) -> Result<()> {
        if self.gemini.api_key.trim().is_empty() {
            return Err(Error::config(
                "GEMINI_API_KEY is not set; the Gemini credential must be provided via the environment",
            ));
        }
        if self.indexing.batch_size == 0 {
            return Err(Error::config("indexing.batch_size must be greater than zero"));
        }
        if self.chunking.chunk_size == 0 {
            return Err(Error::config("chunking.chunk_size must be greater than zero"));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::config(
                "chunking.chunk_overlap must be smaller than chunking.chunk_size",
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::config("retrieval.top_k must be greater than zero"));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Directory of static assets served alongside the API
    pub public_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_dir: PathBuf::from("public"),
        }
    }
}

/// Corpus and store paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directory the corpus is read from, recursively
    pub source_dir: PathBuf,
    /// Directory the persisted vector store is written to / loaded from
    pub store_dir: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("knowledge-base"),
            store_dir: PathBuf::from("vector_store"),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 80,
        }
    }
}

/// Index build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Chunks inserted per batch
    pub batch_size: usize,
    /// Pause between batches, to respect provider rate limits
    pub batch_delay_ms: u64,
}

impl IndexingConfig {
    /// Inter-batch delay as a `Duration`
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            batch_delay_ms: 200,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks retrieved per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 1 }
    }
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API credential, injected from the environment at process start
    #[serde(skip)]
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Embedding dimensions
    pub embed_dimensions: usize,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            embed_model: "text-embedding-004".to_string(),
            embed_dimensions: 768,
            generate_model: "gemini-2.5-flash-preview-05-20".to_string(),
            temperature: 0.3,
            timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> BuddyConfig {
        let mut config = BuddyConfig::default();
        config.gemini.api_key = "test-key".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = BuddyConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.chunking.chunk_size, 800);
        assert_eq!(config.chunking.chunk_overlap, 80);
        assert_eq!(config.indexing.batch_size, 100);
        assert_eq!(config.indexing.batch_delay(), Duration::from_millis(200));
        assert_eq!(config.retrieval.top_k, 1);
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let config = BuddyConfig::default();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(config_with_key().validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let mut config = config_with_key();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_sections_are_optional() {
        let config: BuddyConfig = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8088
            public_dir = "assets"

            [retrieval]
            top_k = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.indexing.batch_size, 100);
    }
}
