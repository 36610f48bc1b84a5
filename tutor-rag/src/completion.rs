//! Completion service seam.
//!
//! The model call is a black box behind [`CompletionService`]. The crate
//! ships an OpenAI implementation behind the `openai` feature; tests and
//! other providers implement the trait directly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SamplingParams;
use crate::error::Result;

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The leading instruction turn.
    System,
    /// The student.
    User,
    /// The tutor.
    Assistant,
}

/// One turn of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Who wrote the turn.
    pub role: Role,
    /// The turn's text.
    pub content: String,
}

impl ChatMessage {
    /// A system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// A user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// An assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A request for one completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    /// The system instruction followed by the recent chat turns.
    pub messages: Vec<ChatMessage>,
    /// Fixed sampling parameters.
    pub sampling: SamplingParams,
}

/// A text-completion backend.
///
/// Implementations should report usage-limit rejections as
/// [`RagError::RateLimited`](crate::RagError::RateLimited) so the chat
/// layer can show its retry-later message.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Generate the assistant's reply text.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
