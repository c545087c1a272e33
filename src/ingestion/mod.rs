//! Corpus loading, chunking, and incremental index construction

pub mod builder;
pub mod chunker;
pub mod loader;

pub use builder::{BuildOutcome, BuildReport, IndexBuilder, SkippedBatch};
pub use chunker::TextChunker;
pub use loader::CorpusLoader;
