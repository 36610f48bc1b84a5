//! Data types for documents, chunks, and ranked results.

use serde::{Deserialize, Serialize};

/// A piece of course material, already reduced to plain text.
///
/// The identifier is what answers cite, so it is normally the file name
/// (for example `Syllabus.pdf`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Human-readable identifier used for citations.
    pub id: String,
    /// The extracted text of the document.
    pub text: String,
}

impl Document {
    /// Create a new document.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

/// A window of consecutive words taken from a [`Document`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// The words of the window joined by single spaces.
    pub text: String,
    /// The ID of the parent [`Document`].
    pub document_id: String,
    /// Position of this window within its document, starting at zero.
    pub ordinal: usize,
}

/// A [`Chunk`] paired with its similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query, or `None` when the ranker returned the
    /// corpus without scoring it.
    pub score: Option<f32>,
}

impl RankedChunk {
    /// Wrap a chunk that was passed through without scoring.
    pub fn unscored(chunk: Chunk) -> Self {
        Self { chunk, score: None }
    }
}
