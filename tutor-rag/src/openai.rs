//! OpenAI completion service using the chat completions API.
//!
//! This module is only available when the `openai` feature is enabled.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::completion::{ChatMessage, CompletionRequest, CompletionService};
use crate::error::{RagError, Result};

/// The default OpenAI API base URL.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const PROVIDER: &str = "OpenAI";

/// A [`CompletionService`] backed by `POST /chat/completions`.
///
/// # Example
///
/// ```rust,ignore
/// use tutor_rag::openai::OpenAiCompletion;
///
/// let service = OpenAiCompletion::from_env()?;
/// let reply = service.complete(request).await?;
/// ```
pub struct OpenAiCompletion {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiCompletion {
    /// Create a new service with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::CompletionError {
                provider: PROVIDER.into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self { client: reqwest::Client::new(), api_key, base_url: OPENAI_BASE_URL.into() })
    }

    /// Create a new service using the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| RagError::CompletionError {
            provider: PROVIDER.into(),
            message: "OPENAI_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key)
    }

    /// Point the service at an OpenAI-compatible server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

// ── OpenAI API request/response types ──────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── CompletionService implementation ───────────────────────────────

#[async_trait]
impl CompletionService for OpenAiCompletion {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        debug!(
            provider = PROVIDER,
            model = %request.sampling.model,
            message_count = request.messages.len(),
            "requesting completion"
        );

        let body = ChatRequest {
            model: &request.sampling.model,
            messages: &request.messages,
            temperature: request.sampling.temperature,
            max_tokens: request.sampling.max_output_tokens,
            top_p: request.sampling.top_p,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                RagError::CompletionError {
                    provider: PROVIDER.into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!(provider = PROVIDER, %status, "rate limited");
                return Err(RagError::RateLimited { provider: PROVIDER.into(), message: detail });
            }

            error!(provider = PROVIDER, %status, "API error");
            return Err(RagError::CompletionError {
                provider: PROVIDER.into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            RagError::CompletionError {
                provider: PROVIDER.into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        chat.choices.into_iter().next().and_then(|c| c.message.content).ok_or_else(|| {
            RagError::CompletionError {
                provider: PROVIDER.into(),
                message: "API returned no choices".into(),
            }
        })
    }
}
