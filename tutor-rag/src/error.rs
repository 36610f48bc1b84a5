//! Error types for the `tutor-rag` crate.

use thiserror::Error;

/// Errors that can occur while building context or talking to the model.
#[derive(Debug, Error)]
pub enum RagError {
    /// The token counter could not be initialised.
    #[error("Tokenizer error: {0}")]
    TokenizerError(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Course material could not be loaded.
    #[error("Loader error ({path}): {message}")]
    LoaderError {
        /// The file or directory that failed.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// The completion service failed for a reason other than rate limiting.
    #[error("Completion error ({provider}): {message}")]
    CompletionError {
        /// The completion provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The completion service rejected the request because of usage limits.
    #[error("Rate limited ({provider}): {message}")]
    RateLimited {
        /// The completion provider that produced the error.
        provider: String,
        /// The message returned by the provider.
        message: String,
    },

    /// A classifier rule could not be compiled.
    #[error(transparent)]
    InvalidPattern(#[from] regex::Error),
}

impl RagError {
    /// Whether the error comes from provider usage limits (HTTP 429).
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RagError::RateLimited { .. })
    }
}

/// A convenience result type for tutor operations.
pub type Result<T> = std::result::Result<T, RagError>;
