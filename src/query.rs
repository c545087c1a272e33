//! Query-time retrieve-then-generate orchestration

use std::sync::Arc;

use crate::error::Result;
use crate::generation::PromptBuilder;
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::retrieval::VectorStore;

/// Retrieve-then-generate service over a loaded, read-only store.
///
/// One instance is shared across concurrent requests; nothing here mutates
/// after construction.
pub struct QueryService {
    store: Arc<VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
}

impl QueryService {
    /// Create a new query service
    pub fn new(
        store: Arc<VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            llm,
            top_k,
        }
    }

    /// Number of chunks in the underlying store
    pub fn store_len(&self) -> usize {
        self.store.len()
    }

    /// Answer a question grounded in the most similar stored chunks.
    ///
    /// The caller is responsible for rejecting empty questions before any
    /// index or model call is made.
    pub async fn answer(&self, question: &str) -> Result<String> {
        let query_embedding = self.embedder.embed(question).await?;
        let results = self.store.search(&query_embedding, self.top_k)?;

        let context = PromptBuilder::build_context(&results);
        tracing::info!("Retrieved {} chunk(s) for question", results.len());
        tracing::debug!("Context for {:?}:\n{}", question, context);

        self.llm.generate(question, &context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Embedder with a fixed question-to-vector table
    struct TableEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    #[async_trait]
    impl EmbeddingProvider for TableEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| Error::embedding(format!("no vector for {:?}", text)))
        }

        fn dimensions(&self) -> usize {
            3
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "table"
        }
    }

    /// LLM that echoes its inputs and records every call
    struct EchoLlm {
        calls: Mutex<Vec<(String, String)>>,
        fail_calls: Vec<usize>,
    }

    impl EchoLlm {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_calls: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for EchoLlm {
        async fn generate(&self, question: &str, context: &str) -> Result<String> {
            let call = {
                let mut calls = self.calls.lock();
                calls.push((question.to_string(), context.to_string()));
                calls.len()
            };
            if self.fail_calls.contains(&call) {
                return Err(Error::llm("model overloaded"));
            }
            Ok(format!("{} || {}", question, context))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }
    }

    fn sample_store() -> Arc<VectorStore> {
        let mut store = VectorStore::new(3);
        store
            .insert(
                "Dropped frames cause flicker".to_string(),
                "frames.md".to_string(),
                vec![1.0, 0.0, 0.0],
            )
            .unwrap();
        store
            .insert(
                "Bananas ripen in the dark".to_string(),
                "fruit.md".to_string(),
                vec![0.0, 1.0, 0.0],
            )
            .unwrap();
        Arc::new(store)
    }

    fn sample_embedder() -> Arc<TableEmbedder> {
        let mut vectors = HashMap::new();
        vectors.insert("What causes flicker?".to_string(), vec![0.9, 0.1, 0.0]);
        vectors.insert("How do bananas ripen?".to_string(), vec![0.1, 0.9, 0.0]);
        Arc::new(TableEmbedder { vectors })
    }

    #[tokio::test]
    async fn test_near_duplicate_query_retrieves_matching_chunk() {
        let llm = Arc::new(EchoLlm::new());
        let service = QueryService::new(sample_store(), sample_embedder(), llm.clone(), 1);

        let answer = service.answer("What causes flicker?").await.unwrap();
        assert!(answer.contains("Dropped frames cause flicker"));
        assert!(!answer.contains("Bananas"));

        let calls = llm.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "Dropped frames cause flicker");
    }

    #[tokio::test]
    async fn test_concurrent_queries_keep_their_own_context() {
        let llm = Arc::new(EchoLlm::new());
        let service = Arc::new(QueryService::new(
            sample_store(),
            sample_embedder(),
            llm.clone(),
            1,
        ));

        let (flicker, bananas) = tokio::join!(
            service.answer("What causes flicker?"),
            service.answer("How do bananas ripen?"),
        );

        let flicker = flicker.unwrap();
        assert!(flicker.starts_with("What causes flicker?"));
        assert!(flicker.contains("Dropped frames"));
        assert!(!flicker.contains("Bananas"));

        let bananas = bananas.unwrap();
        assert!(bananas.starts_with("How do bananas ripen?"));
        assert!(bananas.contains("Bananas ripen"));
        assert!(!bananas.contains("Dropped frames"));
    }

    #[tokio::test]
    async fn test_generation_failure_surfaces_as_llm_error() {
        let llm = Arc::new(EchoLlm {
            calls: Mutex::new(Vec::new()),
            fail_calls: vec![1],
        });
        let service = QueryService::new(sample_store(), sample_embedder(), llm, 1);

        let result = service.answer("What causes flicker?").await;
        assert!(matches!(result, Err(Error::Llm(_))));
    }

    #[tokio::test]
    async fn test_embedding_failure_surfaces_before_generation() {
        let llm = Arc::new(EchoLlm::new());
        let service = QueryService::new(sample_store(), sample_embedder(), llm.clone(), 1);

        let result = service.answer("unknown question").await;
        assert!(matches!(result, Err(Error::Embedding(_))));
        assert!(llm.calls.lock().is_empty());
    }
}
