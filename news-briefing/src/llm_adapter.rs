use crate::config::LlmConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Marker that precedes the article text in summarization prompts.
pub const CONTENT_MARKER: &str = "뉴스 내용:";

/// Fixed sampling settings for every summarization request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 400,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Response was blocked: {0}")]
    Blocked(String),

    #[error("Response contained no text")]
    Empty,
}

/// Generative-text boundary: one prompt in, one completion out.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    fn adapter_name(&self) -> String;

    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, LlmError>;
}

#[derive(Serialize, Debug)]
pub struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
    pub system: &'a str,
    pub messages: Vec<RequestMessage<'a>>,
}

#[derive(Serialize, Debug)]
pub struct RequestMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Deserialize, Debug)]
pub struct ApiErrorDetail {
    pub message: String,
}

impl MessagesResponse {
    /// Concatenated text blocks, trimmed.
    pub fn into_text(self) -> Result<String, LlmError> {
        if self.stop_reason.as_deref() == Some("refusal") {
            return Err(LlmError::Blocked("refusal".to_string()));
        }
        let text: String = self
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        let text = text.trim();
        if text.is_empty() {
            Err(LlmError::Empty)
        } else {
            Ok(text.to_string())
        }
    }
}

/// Client for the Anthropic Messages API.
pub struct AnthropicAdapter {
    client: reqwest::Client,
    config: LlmConfig,
}

impl AnthropicAdapter {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl LlmAdapter for AnthropicAdapter {
    fn adapter_name(&self) -> String {
        format!("Anthropic ({})", self.config.model)
    }

    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, LlmError> {
        let url = format!("{}/messages", self.config.base_url);
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
            system,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(prompt_len = prompt.len(), "Sending request to Anthropic API");

        let res = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        debug!(status = %status, "Anthropic API response received");

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let resp: MessagesResponse = res.json().await?;
        resp.into_text()
    }
}

/// Offline adapter that answers from the prompt itself. Output depends only on the input.
pub struct MockLlmAdapter {
    name: String,
    fail: bool,
}

impl MockLlmAdapter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
        }
    }

    /// Every call errors, as an unreachable service would.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn lead_sentence(prompt: &str) -> String {
        let body = prompt
            .find(CONTENT_MARKER)
            .map(|idx| &prompt[idx + CONTENT_MARKER.len()..])
            .unwrap_or(prompt)
            .trim();
        let sentence = body.split_inclusive(". ").next().unwrap_or(body).trim();
        sentence.chars().take(120).collect()
    }
}

#[async_trait]
impl LlmAdapter for MockLlmAdapter {
    fn adapter_name(&self) -> String {
        format!("Mock LLM Adapter ({})", self.name)
    }

    async fn complete(
        &self,
        _system: &str,
        prompt: &str,
        _sampling: &SamplingConfig,
    ) -> Result<String, LlmError> {
        if self.fail {
            return Err(LlmError::Api {
                status: 503,
                message: "mock adapter configured to fail".to_string(),
            });
        }

        Ok(format!(
            "[핵심 요약]\n- {}\n\n[실무 시사점]\n- 관련 사내 규정과 취업규칙을 점검하세요.\n- 근로자 대상 안내 필요 여부를 검토하세요.",
            Self::lead_sentence(prompt)
        ))
    }
}
