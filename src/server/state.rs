//! Application state for the serving process

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::BuddyConfig;
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, GeminiEmbedder, GeminiGenerator, LlmProvider};
use crate::query::QueryService;
use crate::retrieval::VectorStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: BuddyConfig,
    /// Embedding provider
    embedder: Arc<dyn EmbeddingProvider>,
    /// LLM provider
    llm: Arc<dyn LlmProvider>,
    /// Installed once the knowledge base has finished loading
    service: RwLock<Option<Arc<QueryService>>>,
}

impl AppState {
    /// Create state with providers wired from configuration.
    ///
    /// The knowledge base is not loaded yet; `install_store` flips the
    /// state to ready.
    pub fn new(config: BuddyConfig) -> Result<Self> {
        config.validate()?;

        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(GeminiEmbedder::new(&config.gemini)?);
        let llm: Arc<dyn LlmProvider> = Arc::new(GeminiGenerator::new(&config.gemini)?);

        Ok(Self::with_providers(config, embedder, llm))
    }

    /// Create state with explicit providers
    pub fn with_providers(
        config: BuddyConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                embedder,
                llm,
                service: RwLock::new(None),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &BuddyConfig {
        &self.inner.config
    }

    /// Get embedding provider
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    /// Get LLM provider
    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm
    }

    /// Install a loaded store and make the query service ready
    pub fn install_store(&self, store: VectorStore) {
        let service = Arc::new(QueryService::new(
            Arc::new(store),
            Arc::clone(&self.inner.embedder),
            Arc::clone(&self.inner.llm),
            self.inner.config.retrieval.top_k,
        ));
        *self.inner.service.write() = Some(service);
    }

    /// Check if the server is ready to answer questions
    pub fn is_ready(&self) -> bool {
        self.inner.service.read().is_some()
    }

    /// Query service, or `NotReady` before the knowledge base has loaded
    pub fn query_service(&self) -> Result<Arc<QueryService>> {
        self.inner
            .service
            .read()
            .as_ref()
            .cloned()
            .ok_or(Error::NotReady)
    }
}
