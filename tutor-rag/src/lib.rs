//! # tutor-rag
//!
//! Retrieval-augmented context building for a document-grounded tutor.
//!
//! ## Overview
//!
//! Given a question and a set of course documents, this crate decides how
//! the question should be answered and, when the documents are needed,
//! builds a token-bounded system instruction that embeds the most relevant
//! passages with `[DOC: <id>]` citation tags.
//!
//! - [`WordWindowChunker`] - fixed word-count chunks, no overlap
//! - [`TfIdfRanker`] - per-query TF-IDF cosine ranking
//! - [`QuestionClassifier`] - ordered keyword/pattern routing
//! - [`ContextAssembler`] - greedy token budgeting with [`BpeTokenCounter`]
//! - [`ContextBuilder`] - the whole per-question pass
//! - [`TutorSession`] - chat history and completion error handling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tutor_rag::{ContextBuilder, DirectoryLoader, TutorConfig, TutorSession};
//!
//! let config = TutorConfig::default();
//! let documents = DirectoryLoader::new(config.max_pdf_pages).load("course/")?;
//! let builder = Arc::new(ContextBuilder::builder().config(config).build()?);
//! let mut session = TutorSession::new(builder, documents);
//! let reply = session.ask("What is a system?", &completion).await;
//! ```
//!
//! ## Features
//!
//! - `openai` - [`openai::OpenAiCompletion`], a chat-completions client

pub mod chunking;
pub mod classifier;
pub mod completion;
pub mod config;
pub mod context;
pub mod corpus;
pub mod document;
pub mod error;
pub mod loader;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod ranking;
pub mod session;
pub mod tokenizer;

pub use chunking::{Chunker, WordWindowChunker};
pub use classifier::{ClassificationLabel, QuestionClassifier};
pub use completion::{ChatMessage, CompletionRequest, CompletionService, Role};
pub use config::{
    CHUNK_SIZE, ClassifierConfig, MAX_CHUNKS, MAX_CONTEXT_TOKENS, MAX_PDF_PAGES, OverflowPolicy,
    RESERVED_FOR_COMPLETION, SamplingParams, TutorConfig, TutorConfigBuilder,
};
pub use context::{AssembledContext, ContextAssembler, ContextBudget};
pub use corpus::Corpus;
pub use document::{Chunk, Document, RankedChunk};
pub use error::{RagError, Result};
pub use loader::{DirectoryLoader, normalize_whitespace};
pub use pipeline::{ContextBuilder, ContextBuilderBuilder, PreparedTurn, TurnAction};
pub use prompt::{InstructionPolicy, PromptTemplates, format_fragment};
pub use ranking::{Ranker, TfIdfRanker};
pub use session::{DEFAULT_GREETING, RATE_LIMIT_MESSAGE, TutorSession};
pub use tokenizer::{BpeTokenCounter, TokenCounter};
