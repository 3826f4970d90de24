//! Collect recent commits from a local repository.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use git2::{BranchType, Delta, Diff, Oid, Patch, Repository, Sort};
use tracing::debug;

use crate::commit::model::{Commit, CommitAuthor, CommitDiff, FileDiff, FileStatus};
use crate::error::GitError;

/// Branches whose commits are not attributed to any branch.
const DEFAULT_BRANCHES: &[&str] = &["main", "master"];

/// Which commits to collect.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Inclusive lower bound on commit time.
    pub since: DateTime<Utc>,
    /// Exclusive upper bound on commit time.
    pub until: DateTime<Utc>,
    /// Keep only commits whose author email matches (case-insensitive).
    pub author_email: Option<String>,
    /// Label stored in `Commit::repository`.
    pub repository: String,
}

/// Open the repository containing `path`.
pub fn open_repository(path: &Path) -> Result<Repository, GitError> {
    Repository::discover(path).map_err(GitError::OpenRepository)
}

/// Collect non-merge commits from every local branch within the window.
///
/// Each commit appears once, attributed to the first non-default branch it
/// is reachable from without also being on `main`/`master`, with stats and
/// per-file hunks computed against its first parent. Returned oldest first.
pub fn collect_commits(
    repo: &Repository,
    options: &CollectOptions,
) -> Result<Vec<Commit>, GitError> {
    let branch_of = branch_attribution(repo, options.since)?;
    let author = options.author_email.as_deref().map(str::to_lowercase);

    let mut commits = Vec::new();
    for (oid, branch) in &branch_of {
        let commit = repo.find_commit(*oid).map_err(GitError::ParseCommit)?;
        if commit.parent_count() > 1 {
            continue;
        }

        let Some(date) = Utc.timestamp_opt(commit.time().seconds(), 0).single() else {
            continue;
        };
        if date < options.since || date >= options.until {
            continue;
        }

        let signature = commit.author();
        let email = signature.email().unwrap_or("").to_string();
        if let Some(wanted) = &author
            && email.to_lowercase() != *wanted
        {
            continue;
        }

        let (stats, diff) = commit_diff(repo, &commit)?;
        commits.push(Commit {
            sha: oid.to_string(),
            author: CommitAuthor {
                name: signature.name().unwrap_or("").to_string(),
                email,
            },
            date,
            message: commit.message().unwrap_or("").trim_end().to_string(),
            repository: options.repository.clone(),
            additions: stats.0,
            deletions: stats.1,
            files_changed: stats.2,
            branch: branch.clone(),
            pull_request: None,
            diff: Some(diff),
        });
    }

    commits.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.sha.cmp(&b.sha)));
    debug!(count = commits.len(), "Collected local commits");
    Ok(commits)
}

/// Consecutive commits older than the window after which a branch walk
/// stops. Out-of-order timestamps shorter than this run are walked past.
const STALE_RUN_LIMIT: usize = 50;

/// Map every commit reachable from a local branch (down to `since`) onto the
/// branch it should be reported under.
///
/// Feature branch walks hide the default branches, so history shared with
/// `main`/`master` stays unattributed.
fn branch_attribution(
    repo: &Repository,
    since: DateTime<Utc>,
) -> Result<HashMap<Oid, Option<String>>, GitError> {
    let mut tips = Vec::new();
    for entry in repo
        .branches(Some(BranchType::Local))
        .map_err(GitError::Branches)?
    {
        let (branch, _) = entry.map_err(GitError::Branches)?;
        let Some(name) = branch.name().map_err(GitError::Branches)? else {
            continue;
        };
        if let Some(target) = branch.get().target() {
            tips.push((name.to_string(), target));
        }
    }

    let default_tips: Vec<Oid> = tips
        .iter()
        .filter(|(name, _)| is_default_branch(name))
        .map(|(_, tip)| *tip)
        .collect();

    let cutoff = since.timestamp();
    let mut attribution: HashMap<Oid, Option<String>> = HashMap::new();

    for (name, tip) in tips {
        let is_default = is_default_branch(&name);
        let label = (!is_default).then_some(name);

        let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
        revwalk
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .map_err(GitError::RevwalkError)?;
        revwalk.push(tip).map_err(GitError::RevwalkError)?;
        if !is_default {
            for hidden in &default_tips {
                revwalk.hide(*hidden).map_err(GitError::RevwalkError)?;
            }
        }

        let mut stale_run = 0;
        for oid in revwalk {
            let oid = oid.map_err(GitError::RevwalkError)?;
            let commit = repo.find_commit(oid).map_err(GitError::ParseCommit)?;
            if commit.time().seconds() < cutoff {
                stale_run += 1;
                if stale_run >= STALE_RUN_LIMIT {
                    break;
                }
                continue;
            }
            stale_run = 0;

            let slot = attribution.entry(oid).or_insert(None);
            if slot.is_none() && label.is_some() {
                slot.clone_from(&label);
            }
        }
    }

    Ok(attribution)
}

fn is_default_branch(name: &str) -> bool {
    DEFAULT_BRANCHES.contains(&name)
}

type DiffTotals = (u64, u64, u64);

fn commit_diff(
    repo: &Repository,
    commit: &git2::Commit<'_>,
) -> Result<(DiffTotals, CommitDiff), GitError> {
    let hash = commit.id().to_string();
    let diff_error = |source: git2::Error| GitError::Diff {
        hash: hash.clone(),
        source,
    };

    let tree = commit.tree().map_err(diff_error)?;
    let parent_tree = match commit.parent(0) {
        Ok(parent) => Some(parent.tree().map_err(diff_error)?),
        Err(_) => None,
    };

    let mut diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
        .map_err(diff_error)?;
    diff.find_similar(None).map_err(diff_error)?;

    let stats = diff.stats().map_err(diff_error)?;
    let totals = (
        stats.insertions() as u64,
        stats.deletions() as u64,
        stats.files_changed() as u64,
    );

    let files = file_diffs(&diff).map_err(diff_error)?;
    Ok((totals, CommitDiff { files }))
}

fn file_diffs(diff: &Diff<'_>) -> Result<Vec<FileDiff>, git2::Error> {
    let mut files = Vec::new();
    for idx in 0..diff.deltas().len() {
        let Some(patch) = Patch::from_diff(diff, idx)? else {
            continue;
        };
        let delta = patch.delta();
        let path = delta.new_file().path().or_else(|| delta.old_file().path());
        let Some(filename) = path.map(|p| p.to_string_lossy().into_owned()) else {
            continue;
        };

        let status = match delta.status() {
            Delta::Added => FileStatus::Added,
            Delta::Deleted => FileStatus::Deleted,
            Delta::Renamed => FileStatus::Renamed,
            _ => FileStatus::Modified,
        };
        let binary = delta.flags().is_binary();
        let (_, additions, deletions) = patch.line_stats()?;

        files.push(FileDiff {
            filename,
            status,
            additions: additions as u64,
            deletions: deletions as u64,
            patch: if binary { None } else { hunk_text(&patch)? },
        });
    }
    Ok(files)
}

/// Hunk headers and lines, without the per-file `diff --git` preamble.
fn hunk_text(patch: &Patch<'_>) -> Result<Option<String>, git2::Error> {
    let mut text = String::new();
    for h in 0..patch.num_hunks() {
        let (hunk, lines) = patch.hunk(h)?;
        text.push_str(&String::from_utf8_lossy(hunk.header()));
        for l in 0..lines {
            let line = patch.line_in_hunk(h, l)?;
            match line.origin() {
                origin @ ('+' | '-' | ' ') => text.push(origin),
                _ => {}
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
        }
    }

    let text = text.trim_end().to_string();
    Ok((!text.is_empty()).then_some(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;

    fn signature(email: &str, seconds: i64) -> Signature<'static> {
        Signature::new("Dev", email, &git2::Time::new(seconds, 0)).unwrap()
    }

    fn commit_file(
        repo: &Repository,
        path: &str,
        content: &str,
        message: &str,
        email: &str,
        seconds: i64,
    ) -> Oid {
        let workdir = repo.workdir().unwrap();
        fs::write(workdir.join(path), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(path)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let sig = signature(email, seconds);
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    fn init_repo(path: &Path) -> Repository {
        let mut opts = git2::RepositoryInitOptions::new();
        opts.initial_head("main");
        Repository::init_opts(path, &opts).unwrap()
    }

    fn window(since: i64, until: i64) -> CollectOptions {
        CollectOptions {
            since: Utc.timestamp_opt(since, 0).unwrap(),
            until: Utc.timestamp_opt(until, 0).unwrap(),
            author_email: None,
            repository: "local".to_string(),
        }
    }

    #[test]
    fn test_collects_window_oldest_first_with_hunks() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        commit_file(&repo, "a.txt", "one\n", "initial", "dev@x.io", 1_000);
        commit_file(&repo, "a.txt", "one\ntwo\n", "SC-1 add two", "dev@x.io", 2_000);
        commit_file(&repo, "b.txt", "b\n", "SC-2 add b", "dev@x.io", 3_000);

        let commits = collect_commits(&repo, &window(1_500, 5_000)).unwrap();
        let subjects: Vec<&str> = commits.iter().map(|c| c.subject()).collect();
        assert_eq!(subjects, vec!["SC-1 add two", "SC-2 add b"]);

        let first = &commits[0];
        assert_eq!((first.additions, first.deletions, first.files_changed), (1, 0, 1));
        assert_eq!(first.repository, "local");
        let file = &first.diff.as_ref().unwrap().files[0];
        assert_eq!(file.filename, "a.txt");
        assert_eq!(file.status, FileStatus::Modified);
        let patch = file.patch.as_deref().unwrap();
        assert!(patch.starts_with("@@"));
        assert!(patch.contains("+two"));

        let added = &commits[1].diff.as_ref().unwrap().files[0];
        assert_eq!(added.status, FileStatus::Added);
    }

    #[test]
    fn test_until_is_exclusive_and_author_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        commit_file(&repo, "a.txt", "1\n", "mine", "Me@X.io", 1_000);
        commit_file(&repo, "a.txt", "2\n", "theirs", "other@x.io", 1_100);
        commit_file(&repo, "a.txt", "3\n", "too late", "me@x.io", 2_000);

        let mut options = window(1_000, 2_000);
        options.author_email = Some("me@x.io".to_string());
        let commits = collect_commits(&repo, &options).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].subject(), "mine");
    }

    #[test]
    fn test_feature_branch_attribution() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let base = commit_file(&repo, "a.txt", "1\n", "base", "dev@x.io", 1_000);

        let base_commit = repo.find_commit(base).unwrap();
        repo.branch("feature/SC-9-login", &base_commit, false)
            .unwrap();
        repo.set_head("refs/heads/feature/SC-9-login").unwrap();
        commit_file(&repo, "b.txt", "b\n", "login form", "dev@x.io", 2_000);

        let commits = collect_commits(&repo, &window(0, 10_000)).unwrap();
        let branches: Vec<(&str, Option<&str>)> = commits
            .iter()
            .map(|c| (c.subject(), c.branch.as_deref()))
            .collect();
        assert_eq!(
            branches,
            vec![("base", None), ("login form", Some("feature/SC-9-login"))]
        );
    }

    #[test]
    fn test_skewed_timestamp_does_not_end_walk() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        commit_file(&repo, "a.txt", "1\n", "base", "dev@x.io", 1_000);
        commit_file(&repo, "a.txt", "2\n", "clock was wrong", "dev@x.io", 500);
        commit_file(&repo, "a.txt", "3\n", "latest", "dev@x.io", 3_000);

        let commits = collect_commits(&repo, &window(900, 10_000)).unwrap();
        let subjects: Vec<&str> = commits.iter().map(|c| c.subject()).collect();
        assert_eq!(subjects, vec!["base", "latest"]);
    }

    #[test]
    fn test_default_branch_has_no_attribution() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        commit_file(&repo, "a.txt", "1\n", "only", "dev@x.io", 1_000);
        assert_eq!(repo.head().unwrap().shorthand(), Some("main"));

        let commits = collect_commits(&repo, &window(0, 10_000)).unwrap();
        assert_eq!(commits.len(), 1);
        assert!(commits[0].branch.is_none());
    }
}
