//! Google Gemini `generateContent` adapter.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::{ConfigError, LlmError};
use crate::llm::http::{build_client, send};
use crate::llm::provider::{LanguageModel, Provider, ProviderConfig, reply_text};

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

/// Client for the Gemini API.
#[derive(Debug)]
pub struct GoogleModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
    config: ProviderConfig,
}

impl GoogleModel {
    pub fn new(api_key: String, config: ProviderConfig) -> Result<Self, ConfigError> {
        let base = config.base_url_for(Provider::Google)?;
        let model = config.model_for(Provider::Google);
        Ok(Self {
            client: build_client()?,
            api_key,
            url: format!("{base}/v1beta/models/{model}:generateContent"),
            model,
            config,
        })
    }
}

#[async_trait]
impl LanguageModel for GoogleModel {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &self.config.system_prompt,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
                response_mime_type: "application/json",
            },
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "POST {}", self.url);

        let request = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body);
        let response = send(Provider::Google, request).await?;
        Ok(reply_text(Provider::Google, &response))
    }
}
