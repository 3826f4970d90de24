//! GitHub token discovery.
//!
//! Checked in order:
//! 1. `gh auth token` (gh CLI)
//! 2. GITHUB_TOKEN
//! 3. GH_TOKEN

use std::env;
use std::process::Command;

use tracing::debug;

use crate::error::GitHubError;

/// Get a GitHub token from the gh CLI or the environment.
pub fn get_github_token() -> Result<String, GitHubError> {
    if let Some(token) = token_from_gh_cli() {
        return Ok(token);
    }
    token_from_env().ok_or(GitHubError::AuthenticationFailed)
}

/// Token from GITHUB_TOKEN, then GH_TOKEN. Blank values are ignored.
pub fn token_from_env() -> Option<String> {
    ["GITHUB_TOKEN", "GH_TOKEN"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
}

fn token_from_gh_cli() -> Option<String> {
    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        debug!("gh CLI is not authenticated");
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}
