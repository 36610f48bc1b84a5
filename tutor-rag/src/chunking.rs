//! Document chunking.
//!
//! Chunks are fixed windows of whitespace-separated words. Windows never
//! overlap and ignore sentence or paragraph boundaries.

use tracing::debug;

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
pub trait Chunker: Send + Sync {
    /// Split a single document into chunks.
    ///
    /// Returns an empty `Vec` if the document has no words.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;

    /// Split every document, keeping document order and then chunk order.
    fn chunk_all(&self, documents: &[Document]) -> Vec<Chunk> {
        documents.iter().flat_map(|document| self.chunk(document)).collect()
    }
}

/// Splits text into windows of at most `chunk_size` words.
///
/// # Example
///
/// ```rust
/// use tutor_rag::{Chunker, Document, WordWindowChunker};
///
/// let chunker = WordWindowChunker::new(3);
/// let chunks = chunker.chunk(&Document::new("notes.txt", "one two three four"));
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[1].text, "four");
/// ```
#[derive(Debug, Clone)]
pub struct WordWindowChunker {
    chunk_size: usize,
}

impl WordWindowChunker {
    /// Create a new `WordWindowChunker`.
    ///
    /// A `chunk_size` of zero is treated as one word per chunk.
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size: chunk_size.max(1) }
    }

    /// The number of words per window.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl Chunker for WordWindowChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let words: Vec<&str> = document.text.split_whitespace().collect();

        let chunks: Vec<Chunk> = words
            .chunks(self.chunk_size)
            .enumerate()
            .map(|(ordinal, window)| Chunk {
                text: window.join(" "),
                document_id: document.id.clone(),
                ordinal,
            })
            .collect();

        debug!(document.id = %document.id, words = words.len(), chunk_count = chunks.len(), "chunked document");
        chunks
    }
}
