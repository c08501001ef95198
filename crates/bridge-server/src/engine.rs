//! Analogy engine: prompt → OpenAI-compatible chat completion → structured result.
//!
//! Works with any backend that speaks `POST {base_url}/chat/completions`
//! (OpenAI, vLLM, Ollama, LM Studio, ...).

use async_trait::async_trait;
use conceptbridge_core::prompt::{self, AnalogyContent};
use conceptbridge_core::{GenerationRequest, GenerationResult};
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),
}

/// One chat completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn model(&self) -> &str;

    async fn is_available(&self) -> bool;

    /// Returns the assistant message content.
    async fn complete(&self, request: ChatCompletion) -> Result<String, LlmError>;
}

/// OpenAI-compatible backend.
pub struct OpenAiChat {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiChat {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        })
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(header::AUTHORIZATION, format!("Bearer {}", key)),
            None => request,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

#[async_trait]
impl ChatBackend for OpenAiChat {
    fn model(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        self.authorize(self.client.get(&url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn complete(&self, request: ChatCompletion) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };

        let response = self
            .authorize(self.client.post(self.chat_completions_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed { status, body });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Parse("no content in response".to_string()))
    }
}

/// Turns generation requests into analogies.
pub struct AnalogyEngine {
    backend: Arc<dyn ChatBackend>,
    fallback: bool,
}

impl AnalogyEngine {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            fallback: true,
        }
    }

    /// When enabled, upstream failures yield a template analogy instead of an error.
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    pub async fn is_available(&self) -> bool {
        self.backend.is_available().await
    }

    pub async fn explain(&self, request: &GenerationRequest) -> Result<GenerationResult, LlmError> {
        let started = Instant::now();
        let completion = ChatCompletion {
            system: prompt::SYSTEM_PROMPT.to_string(),
            user: prompt::build_user_prompt(request),
            temperature: prompt::temperature(request.creativity_level),
            max_tokens: request.max_tokens,
        };

        let content: AnalogyContent = match self.backend.complete(completion).await {
            Ok(reply) => prompt::parse_model_output(&reply, &request.concept),
            Err(e) if self.fallback => {
                warn!("Quick analogy generation failed, using template: {}", e);
                prompt::fallback_content(request)
            }
            Err(e) => return Err(e),
        };

        let elapsed = started.elapsed().as_secs_f64();
        info!(
            "Generated analogy for {} -> {} in {:.2}s",
            request.profession, request.concept, elapsed
        );
        Ok(content.into_result(request, elapsed))
    }
}
