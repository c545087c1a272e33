//! Provider abstractions for the external model services

pub mod embedding;
pub mod gemini;
pub mod llm;

pub use embedding::EmbeddingProvider;
pub use gemini::{GeminiEmbedder, GeminiGenerator};
pub use llm::LlmProvider;
