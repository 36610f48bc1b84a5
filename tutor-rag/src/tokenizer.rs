//! Token counting for budget decisions.
//!
//! Counts are only used to decide what fits in the prompt; nothing here
//! produces tokens for generation.

use tiktoken_rs::{CoreBPE, cl100k_base, get_bpe_from_model, o200k_base};
use tracing::debug;

use crate::error::{RagError, Result};

/// Something that can measure text in model tokens.
pub trait TokenCounter: Send + Sync {
    /// Number of tokens `text` encodes to.
    fn count(&self, text: &str) -> usize;
}

/// A [`TokenCounter`] backed by a tiktoken byte-pair encoding.
pub struct BpeTokenCounter {
    bpe: CoreBPE,
    encoding: String,
}

impl BpeTokenCounter {
    /// Create a counter for a model name (`gpt-4o`) or an encoding name
    /// (`o200k_base`, `cl100k_base`).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::TokenizerError`] if the name is unknown or the
    /// encoding cannot be loaded.
    pub fn new(model_or_encoding: &str) -> Result<Self> {
        let lower = model_or_encoding.to_ascii_lowercase();

        let bpe = match get_bpe_from_model(&lower) {
            Ok(bpe) => bpe,
            Err(_) => match lower.as_str() {
                "o200k_base" => o200k_base().map_err(|e| RagError::TokenizerError(e.to_string()))?,
                "cl100k_base" => {
                    cl100k_base().map_err(|e| RagError::TokenizerError(e.to_string()))?
                }
                _ => {
                    return Err(RagError::TokenizerError(format!(
                        "unsupported model or encoding: {model_or_encoding}"
                    )));
                }
            },
        };

        debug!(encoding = %lower, "loaded token encoding");
        Ok(Self { bpe, encoding: lower })
    }

    /// The model or encoding name this counter was created for.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }
}

impl std::fmt::Debug for BpeTokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BpeTokenCounter").field("encoding", &self.encoding).finish()
    }
}

impl TokenCounter for BpeTokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}
