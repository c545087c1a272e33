//! Core data types shared across the build and serve phases

use std::path::PathBuf;

/// A raw document read from the corpus directory
#[derive(Debug, Clone)]
pub struct Document {
    /// Path the text was read from
    pub source_path: PathBuf,
    /// Full file contents
    pub text: String,
}

impl Document {
    /// Create a new document
    pub fn new(source_path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            text: text.into(),
        }
    }
}

/// A bounded slice of a document's text, the unit of embedding and retrieval.
///
/// Invariant: `text` is non-empty after trimming. The chunker discards
/// anything that would violate this before it reaches the index builder.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Chunk text
    pub text: String,
    /// Originating document, kept for provenance
    pub source_path: PathBuf,
}
