//! Configuration for the tutor.
//!
//! Values are fixed for the lifetime of a session. The defaults match the
//! limits the tutor was tuned with: a 15k token context, 800-word chunks and
//! at most eight chunks per prompt.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Default total token budget for the system instruction and question.
pub const MAX_CONTEXT_TOKENS: usize = 15_000;
/// Default number of pages read from each source document.
pub const MAX_PDF_PAGES: usize = 30;
/// Default number of words per chunk.
pub const CHUNK_SIZE: usize = 800;
/// Default maximum number of chunks placed into one prompt.
pub const MAX_CHUNKS: usize = 8;
/// Default number of tokens kept free for the model's answer.
pub const RESERVED_FOR_COMPLETION: usize = 500;

/// What the context assembler does when a chunk does not fit the budget.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Stop at the first chunk that does not fit.
    #[default]
    Stop,
    /// Skip the chunk and keep trying lower-ranked (possibly smaller) ones.
    Skip,
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SamplingParams {
    /// Model name passed to the completion service.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum number of tokens the model may generate.
    pub max_output_tokens: u32,
    /// Nucleus-sampling threshold.
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self { model: "gpt-4o".to_string(), temperature: 0.2, max_output_tokens: 800, top_p: 0.8 }
    }
}

/// Extra keywords merged into the built-in classifier rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Additional off-topic substrings.
    pub extra_irrelevant_keywords: Vec<String>,
    /// Additional general-knowledge trigger words.
    pub extra_general_keywords: Vec<String>,
}

/// Configuration parameters for the tutor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TutorConfig {
    /// Token budget for the whole prompt (instruction plus question).
    pub max_context_tokens: usize,
    /// Pages read from each source document by the loader.
    pub max_pdf_pages: usize,
    /// Words per chunk.
    pub chunk_size: usize,
    /// Maximum number of chunks returned by the ranker.
    pub max_chunks: usize,
    /// Tokens kept free for the model's answer.
    pub reserved_for_completion: usize,
    /// Behaviour when a ranked chunk does not fit.
    pub overflow_policy: OverflowPolicy,
    /// Number of most recent chat turns sent along with the instruction.
    pub history_window: usize,
    /// The subject the tutor is allowed to talk about.
    pub subject: String,
    /// Model or encoding name used for token counting.
    pub encoding_model: String,
    /// Sampling parameters for the completion service.
    pub sampling: SamplingParams,
    /// Classifier keyword extensions.
    pub classifier: ClassifierConfig,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: MAX_CONTEXT_TOKENS,
            max_pdf_pages: MAX_PDF_PAGES,
            chunk_size: CHUNK_SIZE,
            max_chunks: MAX_CHUNKS,
            reserved_for_completion: RESERVED_FOR_COMPLETION,
            overflow_policy: OverflowPolicy::default(),
            history_window: 3,
            subject: "systems engineering".to_string(),
            encoding_model: "gpt-4o".to_string(),
            sampling: SamplingParams::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl TutorConfig {
    /// Create a new builder for constructing a [`TutorConfig`].
    pub fn builder() -> TutorConfigBuilder {
        TutorConfigBuilder::default()
    }

    /// Load a configuration from a JSON file. Missing fields take their
    /// default values. The result is validated.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the file cannot be read, is not
    /// valid JSON, or fails validation.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RagError::ConfigError(format!("failed to read '{}': {e}", path.display()))
        })?;
        let config: TutorConfig = serde_json::from_str(&raw).map_err(|e| {
            RagError::ConfigError(format!("failed to parse '{}': {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_size == 0` or `max_chunks == 0`
    /// - `reserved_for_completion >= max_context_tokens`
    /// - `sampling.temperature` is outside `[0, 2]`
    /// - `sampling.top_p` is outside `(0, 1]`
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if self.max_chunks == 0 {
            return Err(RagError::ConfigError("max_chunks must be greater than zero".to_string()));
        }
        if self.reserved_for_completion >= self.max_context_tokens {
            return Err(RagError::ConfigError(format!(
                "reserved_for_completion ({}) must be less than max_context_tokens ({})",
                self.reserved_for_completion, self.max_context_tokens
            )));
        }
        if !(0.0..=2.0).contains(&self.sampling.temperature) {
            return Err(RagError::ConfigError(format!(
                "temperature ({}) must be within [0, 2]",
                self.sampling.temperature
            )));
        }
        if !(self.sampling.top_p > 0.0 && self.sampling.top_p <= 1.0) {
            return Err(RagError::ConfigError(format!(
                "top_p ({}) must be within (0, 1]",
                self.sampling.top_p
            )));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`TutorConfig`].
#[derive(Debug, Clone, Default)]
pub struct TutorConfigBuilder {
    config: TutorConfig,
}

impl TutorConfigBuilder {
    /// Set the total token budget.
    pub fn max_context_tokens(mut self, tokens: usize) -> Self {
        self.config.max_context_tokens = tokens;
        self
    }

    /// Set the number of pages read per document.
    pub fn max_pdf_pages(mut self, pages: usize) -> Self {
        self.config.max_pdf_pages = pages;
        self
    }

    /// Set the number of words per chunk.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the maximum number of ranked chunks.
    pub fn max_chunks(mut self, max: usize) -> Self {
        self.config.max_chunks = max;
        self
    }

    /// Set the number of tokens kept free for the answer.
    pub fn reserved_for_completion(mut self, tokens: usize) -> Self {
        self.config.reserved_for_completion = tokens;
        self
    }

    /// Set the overflow policy used by the context assembler.
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.config.overflow_policy = policy;
        self
    }

    /// Set how many recent chat turns accompany the instruction.
    pub fn history_window(mut self, turns: usize) -> Self {
        self.config.history_window = turns;
        self
    }

    /// Set the tutoring subject named in the instructions.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.config.subject = subject.into();
        self
    }

    /// Set the model or encoding used for token counting.
    pub fn encoding_model(mut self, model: impl Into<String>) -> Self {
        self.config.encoding_model = model.into();
        self
    }

    /// Set the completion sampling parameters.
    pub fn sampling(mut self, sampling: SamplingParams) -> Self {
        self.config.sampling = sampling;
        self
    }

    /// Set the classifier keyword extensions.
    pub fn classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.config.classifier = classifier;
        self
    }

    /// Build the [`TutorConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`TutorConfig::validate`].
    pub fn build(self) -> Result<TutorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
