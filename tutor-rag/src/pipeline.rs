//! Context builder orchestrator.
//!
//! The [`ContextBuilder`] runs one question through the routing state
//! machine:
//!
//! ```text
//! Start → Classify ─┬─ Irrelevant ─────────────── reply with refusal
//!                   ├─ GeneralKnowledge (date) ─── reply with today's date
//!                   ├─ GeneralKnowledge ────────── general instruction
//!                   └─ DocumentGrounded → Rank → Assemble → grounded instruction
//! ```
//!
//! Each question is a single pass with no retries. Given the same corpus,
//! question and date the result is always the same.
//!
//! # Example
//!
//! ```rust,ignore
//! use tutor_rag::{ContextBuilder, Document, TutorConfig};
//!
//! let builder = ContextBuilder::builder().config(TutorConfig::default()).build()?;
//! let corpus = builder.load_corpus(vec![Document::new("Syllabus.pdf", text)]);
//! let turn = builder.prepare(&corpus, "What is a system?");
//! println!("{}", turn.system_text());
//! ```

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chunking::{Chunker, WordWindowChunker};
use crate::classifier::{ClassificationLabel, QuestionClassifier};
use crate::config::TutorConfig;
use crate::context::{AssembledContext, ContextAssembler, ContextBudget};
use crate::corpus::Corpus;
use crate::document::Document;
use crate::error::{RagError, Result};
use crate::prompt::PromptTemplates;
use crate::ranking::{Ranker, TfIdfRanker};
use crate::tokenizer::{BpeTokenCounter, TokenCounter};

/// What to do with a question once it has been routed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnAction {
    /// Reply directly; the completion service is not called.
    Reply {
        /// The reply text.
        text: String,
    },
    /// Send this instruction to the completion service.
    Prompt(AssembledContext),
}

/// The routing decision and output for one question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreparedTurn {
    /// How the question was classified.
    pub label: ClassificationLabel,
    /// What to do next.
    pub action: TurnAction,
}

impl PreparedTurn {
    /// The instruction or direct reply text.
    pub fn system_text(&self) -> &str {
        match &self.action {
            TurnAction::Reply { text } => text,
            TurnAction::Prompt(context) => &context.instruction,
        }
    }

    /// Whether the completion service must be called.
    pub fn needs_completion(&self) -> bool {
        matches!(self.action, TurnAction::Prompt(_))
    }
}

/// The retrieval-augmented context builder.
///
/// Stateless between questions; all session data lives in the [`Corpus`]
/// and the caller's chat history. Construct one via
/// [`ContextBuilder::builder()`].
pub struct ContextBuilder {
    config: TutorConfig,
    chunker: Arc<dyn Chunker>,
    ranker: Arc<dyn Ranker>,
    classifier: QuestionClassifier,
    assembler: ContextAssembler,
}

impl ContextBuilder {
    /// Create a new [`ContextBuilderBuilder`].
    pub fn builder() -> ContextBuilderBuilder {
        ContextBuilderBuilder::default()
    }

    /// Return a reference to the configuration.
    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    /// Return a reference to the classifier.
    pub fn classifier(&self) -> &QuestionClassifier {
        &self.classifier
    }

    /// Return a reference to the context assembler.
    pub fn assembler(&self) -> &ContextAssembler {
        &self.assembler
    }

    /// Chunk `documents` into a session corpus.
    pub fn load_corpus(&self, documents: Vec<Document>) -> Corpus {
        Corpus::new(documents, self.chunker.as_ref())
    }

    /// The budget every prompt is assembled against.
    pub fn budget(&self) -> ContextBudget {
        ContextBudget::new(self.config.max_context_tokens, self.config.reserved_for_completion)
    }

    /// Route `query` using today's local date for date questions.
    pub fn prepare(&self, corpus: &Corpus, query: &str) -> PreparedTurn {
        self.prepare_on(corpus, query, Local::now().date_naive())
    }

    /// Route `query`, answering date questions with `today`.
    pub fn prepare_on(&self, corpus: &Corpus, query: &str, today: NaiveDate) -> PreparedTurn {
        let label = self.classifier.classify(query);
        let templates = self.assembler.templates();
        let subject = self.assembler.subject();

        let action = match label {
            ClassificationLabel::Irrelevant => {
                TurnAction::Reply { text: templates.render_refusal(subject) }
            }
            ClassificationLabel::GeneralKnowledge { date_query: true } => {
                TurnAction::Reply { text: templates.render_date_answer(today) }
            }
            ClassificationLabel::GeneralKnowledge { date_query: false } => {
                let budget = self.budget().with_question_tokens(self.assembler.counter().count(query));
                TurnAction::Prompt(self.assembler.general(budget))
            }
            ClassificationLabel::DocumentGrounded => {
                let ranked = self.ranker.rank(corpus.chunks(), query, self.config.max_chunks);
                TurnAction::Prompt(self.assembler.assemble(&ranked, query, &self.budget()))
            }
        };

        info!(
            label = label.as_str(),
            needs_completion = matches!(action, TurnAction::Prompt(_)),
            "question routed"
        );
        PreparedTurn { label, action }
    }

    /// Rank and assemble without classification: the document-grounded path
    /// on its own, returning the instruction string.
    pub fn grounded_instruction(&self, corpus: &Corpus, query: &str) -> String {
        let ranked = self.ranker.rank(corpus.chunks(), query, self.config.max_chunks);
        self.assembler.assemble(&ranked, query, &self.budget()).instruction
    }
}

/// Builder for constructing a [`ContextBuilder`].
///
/// Only `config` is required. Unset components default to the ones the
/// config describes: a tiktoken counter for `encoding_model`, a
/// [`WordWindowChunker`] of `chunk_size` words, a [`TfIdfRanker`] and a
/// [`QuestionClassifier`] with the configured keywords.
#[derive(Default)]
pub struct ContextBuilderBuilder {
    config: Option<TutorConfig>,
    token_counter: Option<Arc<dyn TokenCounter>>,
    chunker: Option<Arc<dyn Chunker>>,
    ranker: Option<Arc<dyn Ranker>>,
    classifier: Option<QuestionClassifier>,
    templates: Option<PromptTemplates>,
}

impl ContextBuilderBuilder {
    /// Set the configuration.
    pub fn config(mut self, config: TutorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the token counter.
    pub fn token_counter(mut self, counter: Arc<dyn TokenCounter>) -> Self {
        self.token_counter = Some(counter);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the relevance ranker.
    pub fn ranker(mut self, ranker: Arc<dyn Ranker>) -> Self {
        self.ranker = Some(ranker);
        self
    }

    /// Set the question classifier.
    pub fn classifier(mut self, classifier: QuestionClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Set the instruction templates.
    pub fn templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Build the [`ContextBuilder`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `config` is missing or invalid,
    /// or if `max_context_tokens` leaves no room for the instruction templates
    /// after `reserved_for_completion`, and [`RagError::TokenizerError`] if the default token counter cannot
    /// be loaded.
    pub fn build(self) -> Result<ContextBuilder> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        config.validate()?;

        let counter: Arc<dyn TokenCounter> = match self.token_counter {
            Some(counter) => counter,
            None => Arc::new(BpeTokenCounter::new(&config.encoding_model)?),
        };
        let chunker =
            self.chunker.unwrap_or_else(|| Arc::new(WordWindowChunker::new(config.chunk_size)));
        let ranker = self.ranker.unwrap_or_else(|| Arc::new(TfIdfRanker::new()));
        let classifier =
            self.classifier.unwrap_or_else(|| QuestionClassifier::with_config(&config.classifier));
        let assembler = ContextAssembler::new(counter, config.subject.clone())
            .with_templates(self.templates.unwrap_or_default())
            .with_overflow_policy(config.overflow_policy)
            .with_max_chunks(config.max_chunks);

        let floor = assembler.minimum_instruction_tokens() + config.reserved_for_completion;
        if config.max_context_tokens <= floor {
            return Err(RagError::ConfigError(format!(
                "max_context_tokens ({}) must exceed reserved_for_completion plus the \
                 largest policy instruction ({floor})",
                config.max_context_tokens
            )));
        }

        Ok(ContextBuilder { config, chunker, ranker, classifier, assembler })
    }
}
