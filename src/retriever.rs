use crate::utils::{load_text_files, split_into_chunks};
use crate::vector_db::{ScoredDocument, VectorDB};
use anyhow::Result;
use std::path::Path;
use tracing::debug;

/// Documents indexed when no corpus directory is configured.
const DEFAULT_DOCUMENTS: [(&str, &str); 2] = [
    ("doc1", "RAG retrieves relevant context chunks to ground LLM outputs."),
    ("doc2", "Anthropic Claude excels at tool use and instruction following."),
];

#[derive(Default)]
pub struct Retriever {
    vector_db: VectorDB,
}

impl Retriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vector_db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vector_db.is_empty()
    }

    pub fn add_document(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.vector_db.add_document(id, text);
    }

    pub fn seed_defaults(&mut self) {
        for (id, text) in DEFAULT_DOCUMENTS {
            self.add_document(id, text);
        }
    }

    /// Indexes every `.txt`/`.md` file under `dir`, one document per chunk,
    /// with ids of the form `<relative path>#<chunk index>`. Returns the
    /// number of chunks added.
    pub fn load_directory(&mut self, dir: &Path, chunk_chars: usize) -> Result<usize> {
        let mut added = 0;
        for (path, content) in load_text_files(dir)? {
            let name = path.strip_prefix(dir).unwrap_or(&path).display().to_string();
            for (index, chunk) in split_into_chunks(&content, chunk_chars).into_iter().enumerate() {
                self.add_document(format!("{name}#{index}"), chunk);
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn query(&self, text: &str, top_k: usize) -> Vec<String> {
        self.query_scored(text, top_k)
            .into_iter()
            .map(|hit| hit.content)
            .collect()
    }

    pub fn query_scored(&self, text: &str, top_k: usize) -> Vec<ScoredDocument> {
        let hits = self.vector_db.search_similar(text, top_k);
        for hit in &hits {
            debug!(id = hit.id.as_str(), score = hit.score, "retrieved document");
        }
        hits
    }
}
