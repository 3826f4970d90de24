//! Anthropic messages adapter.
//!
//! `POST {base}/v1/messages` authenticated with `x-api-key`. The API has no
//! native JSON mode, so the system prompt carries the JSON-only instruction.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::{ConfigError, LlmError};
use crate::llm::http::{build_client, send};
use crate::llm::provider::{LanguageModel, Provider, ProviderConfig, reply_text};

/// API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

/// Client for the Anthropic messages API.
#[derive(Debug)]
pub struct AnthropicModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
    config: ProviderConfig,
}

impl AnthropicModel {
    pub fn new(api_key: String, config: ProviderConfig) -> Result<Self, ConfigError> {
        let base = config.base_url_for(Provider::Anthropic)?;
        Ok(Self {
            client: build_client()?,
            api_key,
            model: config.model_for(Provider::Anthropic),
            url: format!("{base}/v1/messages"),
            config,
        })
    }
}

#[async_trait]
impl LanguageModel for AnthropicModel {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: &self.config.system_prompt,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "POST {}", self.url);

        let request = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);
        let response = send(Provider::Anthropic, request).await?;
        Ok(reply_text(Provider::Anthropic, &response))
    }
}
