//! Error types for standup modules using thiserror.

use thiserror::Error;

use crate::llm::Provider;

/// Configuration problems detected before any network call is made.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No API key configured for {0}. Set {env} or pass one explicitly.", env = .0.credential_env())]
    MissingCredential(Provider),

    #[error("Unsupported LLM provider '{0}'. Expected one of: openai, anthropic, google")]
    UnsupportedProvider(String),

    #[error("Invalid base URL '{0}': must start with http:// or https://")]
    InvalidBaseUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Errors from a language model round trip.
///
/// Malformed model output is never represented here; it degrades to a
/// best-effort summary instead.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{provider} API error (status {status}): {message}")]
    Http {
        provider: Provider,
        status: u16,
        message: String,
    },

    #[error("{provider} request could not be sent: {source}")]
    Transport {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },
}

impl LlmError {
    /// The vendor involved, when the error came from one.
    pub fn provider(&self) -> Option<Provider> {
        match self {
            LlmError::Config(ConfigError::MissingCredential(provider)) => Some(*provider),
            LlmError::Config(_) => None,
            LlmError::Http { provider, .. } | LlmError::Transport { provider, .. } => {
                Some(*provider)
            }
        }
    }
}

/// Errors from GitHub API operations.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error(
        "GitHub authentication failed: no valid auth found. Run 'gh auth login' or set GITHUB_TOKEN environment variable"
    )]
    AuthenticationFailed,

    #[error("Failed to create GitHub client: {0}")]
    Client(#[source] Box<octocrab::Error>),

    #[error("Failed to fetch commit: {0}")]
    FetchCommit(#[source] Box<octocrab::Error>),

    #[error("Rate limited by GitHub API")]
    RateLimited,

    #[error("Commit {sha} not found in {repository}")]
    CommitNotFound { repository: String, sha: String },

    #[error("Invalid repository '{0}': expected owner/name")]
    InvalidRepository(String),
}

/// Errors from local git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to list branches: {0}")]
    Branches(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to read commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to diff commit {hash}: {source}")]
    Diff {
        hash: String,
        #[source]
        source: git2::Error,
    },
}
