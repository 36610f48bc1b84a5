//! Per-student chat session.
//!
//! A [`TutorSession`] owns everything that lives for one conversation: the
//! immutable corpus, the chat history and a handle to the shared
//! [`ContextBuilder`]. Nothing is kept in globals, so several sessions can
//! run side by side.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::completion::{ChatMessage, CompletionRequest, CompletionService, Role};
use crate::corpus::Corpus;
use crate::document::Document;
use crate::pipeline::{ContextBuilder, PreparedTurn, TurnAction};

/// Reply shown when the completion service reports usage limits.
pub const RATE_LIMIT_MESSAGE: &str =
    "⚠️ Usage limit exceeded. Please wait a minute before asking another question.";

/// Greeting placed at the top of a fresh history.
pub const DEFAULT_GREETING: &str = "👋 Hi! What topic do you need help with?";

/// One conversation over a fixed set of documents.
pub struct TutorSession {
    builder: Arc<ContextBuilder>,
    corpus: Arc<Corpus>,
    history: Vec<ChatMessage>,
    greeting: String,
}

impl TutorSession {
    /// Start a session over `documents`.
    pub fn new(builder: Arc<ContextBuilder>, documents: Vec<Document>) -> Self {
        let corpus = Arc::new(builder.load_corpus(documents));
        Self::with_corpus(builder, corpus)
    }

    /// Start a session over an already chunked corpus.
    pub fn with_corpus(builder: Arc<ContextBuilder>, corpus: Arc<Corpus>) -> Self {
        let greeting = DEFAULT_GREETING.to_string();
        Self { builder, corpus, history: vec![ChatMessage::assistant(greeting.clone())], greeting }
    }

    /// Use a custom greeting, e.g. one that names the student.
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self.clear_history();
        self
    }

    /// The session's corpus.
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// The chat history, oldest first.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Reset the history to the greeting.
    pub fn clear_history(&mut self) {
        self.history = vec![ChatMessage::assistant(self.greeting.clone())];
    }

    /// Answer `question`, recording both turns in the history.
    ///
    /// Never fails: completion errors become a reply text. Rate limiting
    /// yields [`RATE_LIMIT_MESSAGE`]; any other failure yields
    /// `⚠️ Error: <details>`.
    pub async fn ask(&mut self, question: &str, completion: &dyn CompletionService) -> String {
        let turn = self.builder.prepare(&self.corpus, question);
        self.answer(question, turn, completion).await
    }

    /// Like [`ask`](Self::ask) with a fixed date for date questions.
    pub async fn ask_on(
        &mut self,
        question: &str,
        today: NaiveDate,
        completion: &dyn CompletionService,
    ) -> String {
        let turn = self.builder.prepare_on(&self.corpus, question, today);
        self.answer(question, turn, completion).await
    }

    async fn answer(
        &mut self,
        question: &str,
        turn: PreparedTurn,
        completion: &dyn CompletionService,
    ) -> String {
        self.history.push(ChatMessage::user(question));

        let reply = match turn.action {
            TurnAction::Reply { text } => text,
            TurnAction::Prompt(context) => {
                let request = self.request_for(context.instruction);
                match completion.complete(request).await {
                    Ok(text) => text,
                    Err(e) if e.is_rate_limited() => {
                        warn!(provider = completion.name(), error = %e, "completion rate limited");
                        RATE_LIMIT_MESSAGE.to_string()
                    }
                    Err(e) => {
                        error!(provider = completion.name(), error = %e, "completion failed");
                        format!("⚠️ Error: {e}")
                    }
                }
            }
        };

        info!(label = turn.label.as_str(), history_len = self.history.len() + 1, "answered question");
        self.history.push(ChatMessage::assistant(reply.clone()));
        reply
    }

    /// The system instruction followed by the last `history_window` turns.
    fn request_for(&self, instruction: String) -> CompletionRequest {
        let config = self.builder.config();
        let turns: Vec<&ChatMessage> =
            self.history.iter().filter(|m| m.role != Role::System).collect();
        let start = turns.len().saturating_sub(config.history_window);

        let mut messages = vec![ChatMessage::system(instruction)];
        messages.extend(turns[start..].iter().map(|m| (*m).clone()));
        CompletionRequest { messages, sampling: config.sampling.clone() }
    }
}
