//! OpenAI chat completions adapter.
//!
//! `POST {base}/v1/chat/completions` with a bearer token. JSON mode is
//! requested natively through `response_format`.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::{ConfigError, LlmError};
use crate::llm::http::{build_client, send};
use crate::llm::provider::{LanguageModel, Provider, ProviderConfig, reply_text};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

/// Client for the OpenAI chat completions API.
#[derive(Debug)]
pub struct OpenAiModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
    config: ProviderConfig,
}

impl OpenAiModel {
    pub fn new(api_key: String, config: ProviderConfig) -> Result<Self, ConfigError> {
        let base = config.base_url_for(Provider::OpenAi)?;
        Ok(Self {
            client: build_client()?,
            api_key,
            model: config.model_for(Provider::OpenAi),
            url: format!("{base}/v1/chat/completions"),
            config,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "POST {}", self.url);

        let request = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body);
        let response = send(Provider::OpenAi, request).await?;
        Ok(reply_text(Provider::OpenAi, &response))
    }
}
