//! Provider selection, shared request settings and the adapter trait.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, LlmError};
use crate::llm::anthropic::AnthropicModel;
use crate::llm::google::GoogleModel;
use crate::llm::normalize::normalize_summary;
use crate::llm::openai::OpenAiModel;
use crate::summary::{SYSTEM_PROMPT, SummaryResult};

/// Default output token cap.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Low but non-zero: mostly deterministic without fully greedy decoding.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Supported LLM vendors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Anthropic,
    Google,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Anthropic, Provider::Google];

    /// Display name of the vendor.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::Google => "Google",
        }
    }

    /// Environment variable conventionally holding the vendor's API key.
    pub fn credential_env(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Google => "GEMINI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-haiku-latest",
            Provider::Google => "gemini-1.5-flash",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com",
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::Google => "https://generativelanguage.googleapis.com",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "google" | "gemini" => Ok(Provider::Google),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Request settings shared by every vendor.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Model name; the vendor default when `None`.
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// API root; the vendor's public endpoint when `None`.
    pub base_url: Option<String>,
    pub system_prompt: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            base_url: None,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }
}

impl ProviderConfig {
    pub(crate) fn model_for(&self, provider: Provider) -> String {
        self.model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string())
    }

    /// Base URL without trailing slashes, validated to be http(s).
    pub(crate) fn base_url_for(&self, provider: Provider) -> Result<String, ConfigError> {
        let base = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| provider.default_base_url())
            .trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(base.to_string()));
        }
        Ok(base.trim_end_matches('/').to_string())
    }
}

/// A vendor reply envelope, tagged by vendor.
#[derive(Debug, Clone, PartialEq)]
pub enum RawReply {
    OpenAi(Value),
    Anthropic(Value),
    Google(Value),
}

impl RawReply {
    /// Wrap a decoded envelope for the given vendor.
    pub fn new(provider: Provider, envelope: Value) -> Self {
        match provider {
            Provider::OpenAi => RawReply::OpenAi(envelope),
            Provider::Anthropic => RawReply::Anthropic(envelope),
            Provider::Google => RawReply::Google(envelope),
        }
    }

    /// The generated text, if the envelope has it where the vendor puts it.
    pub fn text(&self) -> Option<String> {
        let text = match self {
            RawReply::OpenAi(v) => v
                .pointer("/choices/0/message/content")
                .and_then(Value::as_str)
                .map(str::to_string),
            RawReply::Anthropic(v) => v.get("content").and_then(Value::as_array).map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b.get("type").and_then(Value::as_str).unwrap_or("text") == "text")
                    .filter_map(|b| b.get("text").and_then(Value::as_str))
                    .collect::<String>()
            }),
            RawReply::Google(v) => v
                .pointer("/candidates/0/content/parts")
                .and_then(Value::as_array)
                .map(|parts| {
                    parts
                        .iter()
                        .filter_map(|p| p.get("text").and_then(Value::as_str))
                        .collect::<String>()
                }),
        };
        text.filter(|t| !t.trim().is_empty())
    }
}

/// Extract generated text from a successful response body.
///
/// Falls back to the body itself when the envelope is not the vendor's
/// documented shape, so normalization can still salvage something.
pub(crate) fn reply_text(provider: Provider, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|envelope| RawReply::new(provider, envelope).text())
        .unwrap_or_else(|| body.to_string())
}

/// One vendor's chat/completion endpoint.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn provider(&self) -> Provider;

    /// Send the prompt and return the generated text.
    ///
    /// Only configuration, transport and non-2xx failures are errors.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Send the prompt and normalize the reply into a summary.
    async fn summarize(&self, prompt: &str) -> Result<SummaryResult, LlmError> {
        let text = self.complete(prompt).await?;
        Ok(normalize_summary(&text))
    }
}

/// Build the adapter for a vendor.
///
/// Fails before any network activity when the credential is missing or blank.
pub fn build_model(
    provider: Provider,
    credential: Option<&str>,
    config: ProviderConfig,
) -> Result<Box<dyn LanguageModel>, ConfigError> {
    let api_key = credential
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(ConfigError::MissingCredential(provider))?
        .to_string();

    let model: Box<dyn LanguageModel> = match provider {
        Provider::OpenAi => Box::new(OpenAiModel::new(api_key, config)?),
        Provider::Anthropic => Box::new(AnthropicModel::new(api_key, config)?),
        Provider::Google => Box::new(GoogleModel::new(api_key, config)?),
    };
    Ok(model)
}
