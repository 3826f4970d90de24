//! Environment-driven configuration for the CLI.
//!
//! Every value has a default; malformed values log a warning and fall back
//! rather than failing the run. Command-line flags override these.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::llm::Provider;

/// Default timeout for one summary generation (2 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const PROVIDER_ENV_VAR: &str = "STANDUP_PROVIDER";
const MODEL_ENV_VAR: &str = "STANDUP_MODEL";
const TIMEOUT_ENV_VAR: &str = "STANDUP_TIMEOUT";
const TICKET_BASE_URL_ENV_VAR: &str = "JIRA_BASE_URL";

/// Secondary key variable accepted for Google.
const GOOGLE_FALLBACK_ENV_VAR: &str = "GOOGLE_API_KEY";

/// Settings resolved from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub provider: Provider,
    pub model: Option<String>,
    pub ticket_base_url: Option<String>,
    pub timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            provider: get_provider(),
            model: non_empty_var(MODEL_ENV_VAR),
            ticket_base_url: non_empty_var(TICKET_BASE_URL_ENV_VAR),
            timeout: get_timeout(),
        }
    }
}

/// API key for `provider`, if one is set.
pub fn credential_for(provider: Provider) -> Option<String> {
    non_empty_var(provider.credential_env()).or_else(|| match provider {
        Provider::Google => non_empty_var(GOOGLE_FALLBACK_ENV_VAR),
        _ => None,
    })
}

fn get_provider() -> Provider {
    match env::var(PROVIDER_ENV_VAR) {
        Ok(v) if !v.trim().is_empty() => v.parse().unwrap_or_else(|_| {
            warn!(
                "Invalid {} value '{}', using default {}",
                PROVIDER_ENV_VAR,
                v,
                Provider::default()
            );
            Provider::default()
        }),
        _ => Provider::default(),
    }
}

/// Reads STANDUP_TIMEOUT (seconds), falling back to 120.
fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
