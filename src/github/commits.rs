//! Per-commit diff fetching from the GitHub REST API.

use std::collections::HashMap;
use std::sync::Arc;

use octocrab::Octocrab;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::commit::model::{Commit, CommitDiff, FileDiff, FileStatus};
use crate::error::GitHubError;

/// Limits for a batch of diff fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffFetchOptions {
    /// Requests in flight at once.
    pub max_concurrency: usize,
    /// Targets considered per batch; the rest are skipped.
    pub max_commits: usize,
}

impl Default for DiffFetchOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 5,
            max_commits: 30,
        }
    }
}

/// A commit whose diff should be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffTarget {
    /// `owner/name`
    pub repository: String,
    pub sha: String,
}

/// Diff plus the totals GitHub reports for the commit.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDiff {
    pub diff: CommitDiff,
    pub additions: u64,
    pub deletions: u64,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    stats: Option<CommitStats>,
    #[serde(default)]
    files: Vec<CommitFile>,
}

#[derive(Debug, Default, Deserialize)]
struct CommitStats {
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
}

#[derive(Debug, Deserialize)]
struct CommitFile {
    filename: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    #[serde(default)]
    patch: Option<String>,
}

impl CommitResponse {
    fn into_fetched(self) -> FetchedDiff {
        let files: Vec<FileDiff> = self
            .files
            .into_iter()
            .map(|file| FileDiff {
                filename: file.filename,
                status: FileStatus::from_label(&file.status),
                additions: file.additions,
                deletions: file.deletions,
                patch: file.patch,
            })
            .collect();

        let stats = self.stats.unwrap_or_else(|| CommitStats {
            additions: files.iter().map(|f| f.additions).sum(),
            deletions: files.iter().map(|f| f.deletions).sum(),
        });

        FetchedDiff {
            diff: CommitDiff { files },
            additions: stats.additions,
            deletions: stats.deletions,
        }
    }
}

/// Split `owner/name` into its parts.
pub fn parse_repository(repository: &str) -> Result<(&str, &str), GitHubError> {
    let trimmed = repository.trim().trim_end_matches(".git");
    match trimmed.split_once('/') {
        Some((owner, name))
            if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
        {
            Ok((owner, name))
        }
        _ => Err(GitHubError::InvalidRepository(repository.to_string())),
    }
}

/// GitHub client for commit lookups. Cheap to clone.
#[derive(Clone)]
pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    /// Client for api.github.com. Unauthenticated requests work for public
    /// repositories, with a much lower rate limit.
    pub fn new(token: Option<String>) -> Result<Self, GitHubError> {
        Self::build(None, token)
    }

    /// Client for a custom endpoint (GitHub Enterprise, mock servers).
    pub fn with_base_url(base_url: &str, token: Option<String>) -> Result<Self, GitHubError> {
        Self::build(Some(base_url), token)
    }

    /// Wrap a pre-configured octocrab instance.
    pub fn with_octocrab(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }

    fn build(base_url: Option<&str>, token: Option<String>) -> Result<Self, GitHubError> {
        let mut builder = Octocrab::builder();
        if let Some(base_url) = base_url {
            builder = builder
                .base_uri(base_url)
                .map_err(|e| GitHubError::Client(Box::new(e)))?;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            builder = builder.personal_token(token);
        }
        let octocrab = builder
            .build()
            .map_err(|e| GitHubError::Client(Box::new(e)))?;
        Ok(Self { octocrab })
    }

    /// Fetch one commit's per-file patches and stats.
    pub async fn fetch_commit(
        &self,
        repository: &str,
        sha: &str,
    ) -> Result<FetchedDiff, GitHubError> {
        let (owner, name) = parse_repository(repository)?;
        let route = format!("/repos/{owner}/{name}/commits/{sha}");
        debug!("GET {}", route);

        let response: CommitResponse = self
            .octocrab
            .get(&route, None::<&()>)
            .await
            .map_err(|e| classify_error(e, repository, sha))?;
        Ok(response.into_fetched())
    }
}

fn classify_error(error: octocrab::Error, repository: &str, sha: &str) -> GitHubError {
    // octocrab's Display and Debug carry different parts of the GitHub reply
    let display = error.to_string();
    let debug = format!("{error:?}");

    if display.to_lowercase().contains("rate limit") || debug.to_lowercase().contains("rate limit")
    {
        return GitHubError::RateLimited;
    }
    if display.contains("Not Found") || debug.contains("Not Found") {
        return GitHubError::CommitNotFound {
            repository: repository.to_string(),
            sha: sha.to_string(),
        };
    }
    GitHubError::FetchCommit(Box::new(error))
}

/// Commits that still need a diff, in input order.
///
/// Commits without a usable `owner/name` repository fall back to
/// `default_repository`; if neither is usable the commit is skipped.
pub fn diff_targets(commits: &[Commit], default_repository: Option<&str>) -> Vec<DiffTarget> {
    commits
        .iter()
        .filter(|c| c.diff.is_none())
        .filter_map(|c| {
            let repository = if parse_repository(&c.repository).is_ok() {
                c.repository.as_str()
            } else {
                default_repository.filter(|r| parse_repository(r).is_ok())?
            };
            Some(DiffTarget {
                repository: repository.to_string(),
                sha: c.sha.clone(),
            })
        })
        .collect()
}

/// Fetch diffs for up to `max_commits` targets, `max_concurrency` at a time.
///
/// Individual failures are logged and left out of the returned map; the
/// batch as a whole never fails.
pub async fn fetch_diffs(
    client: &GitHubClient,
    targets: &[DiffTarget],
    options: &DiffFetchOptions,
) -> HashMap<String, FetchedDiff> {
    if targets.len() > options.max_commits {
        debug!(
            requested = targets.len(),
            limit = options.max_commits,
            "Limiting diff fetches"
        );
    }

    let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for target in targets.iter().take(options.max_commits).cloned() {
        let client = client.clone();
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire().await;
            let result = client.fetch_commit(&target.repository, &target.sha).await;
            (target, result)
        });
    }

    let mut diffs = HashMap::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((target, Ok(fetched))) => {
                diffs.insert(target.sha, fetched);
            }
            Ok((target, Err(e))) => {
                warn!(
                    repository = %target.repository,
                    sha = %target.sha,
                    error = %e,
                    "Failed to fetch commit diff"
                );
            }
            Err(e) => warn!(error = %e, "Diff fetch task failed"),
        }
    }
    diffs
}

/// Copy fetched diffs onto their commits.
///
/// Stats are only taken from the fetch when the commit carried none.
/// Returns the number of commits updated.
pub fn attach_diffs(commits: &mut [Commit], mut diffs: HashMap<String, FetchedDiff>) -> usize {
    let mut attached = 0;
    for commit in commits.iter_mut() {
        let Some(fetched) = diffs.remove(&commit.sha) else {
            continue;
        };
        if commit.additions == 0 && commit.deletions == 0 {
            commit.additions = fetched.additions;
            commit.deletions = fetched.deletions;
        }
        if commit.files_changed == 0 {
            commit.files_changed = fetched.diff.files.len() as u64;
        }
        commit.diff = Some(fetched.diff);
        attached += 1;
    }
    attached
}
