//! Text chunking with sentence-boundary splitting

use unicode_segmentation::UnicodeSegmentation;

use crate::types::{Chunk, Document};

/// Text chunker with configurable size and overlap.
///
/// Splitting prefers sentence boundaries before overflowing the target size;
/// consecutive chunks share an overlap tail for continuity. Chunks that are
/// empty after trimming are discarded here, because the embedding provider
/// rejects empty input.
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Split every document, in order, discarding empty chunks.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|doc| self.split_document(doc))
            .collect()
    }

    /// Split one document into overlapping chunks.
    pub fn split_document(&self, doc: &Document) -> Vec<Chunk> {
        self.chunk_text(&doc.text)
            .into_iter()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .map(|text| Chunk {
                text,
                source_path: doc.source_path.clone(),
            })
            .collect()
    }

    fn chunk_text(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for sentence in text.split_sentence_bounds() {
            if !current.is_empty() && current.len() + sentence.len() > self.chunk_size {
                let overlap = self.overlap_tail(&current);
                chunks.push(std::mem::replace(&mut current, overlap));
            }
            current.push_str(sentence);
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }

    /// Tail of `text` carried into the next chunk, preferring a word boundary.
    fn overlap_tail(&self, text: &str) -> String {
        if self.overlap == 0 {
            return String::new();
        }
        if text.len() <= self.overlap {
            return text.to_string();
        }

        let mut start = text.len() - self.overlap;

        // Stay on a valid UTF-8 character boundary
        while start > 0 && !text.is_char_boundary(start) {
            start -= 1;
        }

        let tail = &text[start..];

        match tail.find(' ') {
            Some(pos) if pos + 1 < tail.len() => tail[pos + 1..].to_string(),
            _ => tail.to_string(),
        }
    }
}
