//! Language-model summarizer over any OpenAI-compatible
//! `/v1/chat/completions` endpoint.
//!
//! Works with:
//! - **Ollama** (default): `http://localhost:11434/v1/chat/completions`
//! - **OpenAI**: `https://api.openai.com/v1/chat/completions`
//! - **LiteLLM / vLLM / any OpenAI-compatible server**: just set the URL
//!
//! Each request is bounded by a timeout. A timeout, transport error,
//! non-success status, or empty reply is reported as
//! `Error::SummarizationFailed`; nothing is retried.

use super::Summarizer;
use super::context::SummaryContext;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default endpoint (a local Ollama server).
pub const DEFAULT_LLM_URL: &str = "http://localhost:11434/v1/chat/completions";

/// Default model name.
pub const DEFAULT_LLM_MODEL: &str = "llama3.2";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = "You summarize software tickets written as architecture decision \
records. Given a ticket and the tickets it depends on, explain in a few short paragraphs what \
must be finished first, which earlier decisions constrain this ticket, and any risks the \
dependency chain introduces. Answer in plain text.";

/// Connection settings for [`LlmSummarizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    /// Full endpoint URL
    pub url: String,
    /// Model name sent with each request
    pub model: String,
    /// Bearer token, if the endpoint needs one
    pub api_key: Option<String>,
    /// Upper bound on one request
    pub timeout: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_LLM_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Summarizer backed by a chat-completions endpoint.
///
/// Cheaply cloneable (shares the reqwest client internally).
#[derive(Clone)]
pub struct LlmSummarizer {
    client: reqwest::Client,
    settings: LlmSettings,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// OpenAI-compatible error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl LlmSummarizer {
    /// Create a summarizer with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the HTTP client cannot be built.
    pub fn new(settings: LlmSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, settings })
    }

    /// The settings in use.
    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    async fn request(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.2,
        };

        let mut req = self.client.post(&self.settings.url).json(&body);
        if let Some(key) = &self.settings.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            Error::SummarizationFailed(format!(
                "failed to reach {}: {e}",
                self.settings.url
            ))
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .and_then(|r| r.error)
                .map_or(text, |d| d.message);
            return Err(Error::SummarizationFailed(format!(
                "backend returned {}: {detail}",
                status.as_u16()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::SummarizationFailed(format!("malformed response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::SummarizationFailed("backend returned an empty reply".to_string())
            })
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    fn name(&self) -> &'static str {
        "llm"
    }

    fn is_ai(&self) -> bool {
        true
    }

    #[tracing::instrument(
        skip(self, ctx),
        fields(ticket = %ctx.ticket.id, model = %self.settings.model)
    )]
    async fn summarize(&self, ctx: &SummaryContext) -> Result<String> {
        let prompt = ctx.prompt();
        match tokio::time::timeout(self.settings.timeout, self.request(&prompt)).await {
            Ok(result) => result,
            Err(_) => Err(Error::SummarizationFailed(format!(
                "timed out after {}s",
                self.settings.timeout.as_secs_f32()
            ))),
        }
    }
}
