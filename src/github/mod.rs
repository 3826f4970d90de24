//! GitHub REST access for commit diffs.

pub mod auth;
pub mod commits;

pub use auth::get_github_token;
pub use commits::{
    DiffFetchOptions, DiffTarget, FetchedDiff, GitHubClient, attach_diffs, diff_targets,
    fetch_diffs, parse_repository,
};
