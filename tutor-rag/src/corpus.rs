//! The session's loaded course material.

use tracing::info;

use crate::chunking::Chunker;
use crate::document::{Chunk, Document};

/// Documents loaded for a session together with their chunks.
///
/// Documents never change within a session, so chunks are computed once
/// here instead of on every question.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    chunks: Vec<Chunk>,
}

impl Corpus {
    /// Chunk `documents` with `chunker`, keeping the given document order.
    pub fn new(documents: Vec<Document>, chunker: &dyn Chunker) -> Self {
        let chunks = chunker.chunk_all(&documents);
        info!(document_count = documents.len(), chunk_count = chunks.len(), "corpus ready");
        Self { documents, chunks }
    }

    /// A corpus with no documents.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The loaded documents, in load order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// All chunks, grouped by document in load order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Whether no document was loaded.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
