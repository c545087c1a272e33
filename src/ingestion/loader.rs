//! Corpus loading from a source directory

use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::types::Document;

/// File extensions recognized as corpus content
const SUPPORTED_EXTENSIONS: [&str; 5] = ["md", "js", "json", "css", "html"];

/// Reads raw documents from the corpus directory
pub struct CorpusLoader;

impl CorpusLoader {
    /// Read all supported files under `dir`, recursively.
    ///
    /// Unreadable files are logged and skipped; a missing directory is a
    /// configuration error.
    pub fn load_dir(dir: &Path) -> Result<Vec<Document>> {
        if !dir.is_dir() {
            return Err(Error::Config(format!(
                "corpus directory {} does not exist",
                dir.display()
            )));
        }

        let mut documents = Vec::new();

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !Self::is_supported(path) {
                continue;
            }

            match std::fs::read_to_string(path) {
                Ok(text) => documents.push(Document::new(path, text)),
                Err(e) => tracing::warn!("Skipping unreadable file {}: {}", path.display(), e),
            }
        }

        Ok(documents)
    }

    fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|supported| supported.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
