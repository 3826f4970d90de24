//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use git2::{Oid, Repository, RepositoryInitOptions, Signature, Time};

use standup::commit::{
    Commit, CommitAuthor, CommitDiff, FileDiff, FileStatus, PullRequestRef, PullRequestState,
};

/// Fixed timestamp used by commit builders (2024-03-04T10:00:00Z).
pub fn fixed_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap()
}

/// A commit with stats but no branch, PR or diff.
pub fn commit(sha: &str, message: &str) -> Commit {
    Commit {
        sha: sha.to_string(),
        author: CommitAuthor {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
        },
        date: fixed_date(),
        message: message.to_string(),
        repository: "acme/app".to_string(),
        additions: 10,
        deletions: 2,
        files_changed: 1,
        branch: None,
        pull_request: None,
        diff: None,
    }
}

pub fn on_branch(mut commit: Commit, branch: &str) -> Commit {
    commit.branch = Some(branch.to_string());
    commit
}

pub fn with_pr(mut commit: Commit, number: u64, title: &str, head_branch: &str) -> Commit {
    commit.pull_request = Some(PullRequestRef {
        number,
        title: title.to_string(),
        url: format!("https://github.com/acme/app/pull/{number}"),
        state: PullRequestState::Merged,
        head_branch: Some(head_branch.to_string()),
        merged_at: None,
    });
    commit
}

pub fn with_patch(mut commit: Commit, filename: &str, patch: &str) -> Commit {
    commit.diff = Some(CommitDiff {
        files: vec![FileDiff {
            filename: filename.to_string(),
            status: FileStatus::Modified,
            additions: commit.additions,
            deletions: commit.deletions,
            patch: Some(patch.to_string()),
        }],
    });
    commit
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository whose initial branch is `main`.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).expect("Failed to init git repo");
        Self { dir, repo }
    }

    /// Write `content` to `path` and commit it on the current HEAD at `when`.
    pub fn commit_file(
        &self,
        path: &str,
        content: &str,
        message: &str,
        email: &str,
        when: DateTime<Utc>,
    ) -> Oid {
        std::fs::write(self.dir.path().join(path), content).expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(path)).expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let sig = Signature::new("Test User", email, &Time::new(when.timestamp(), 0))
            .expect("Failed to create signature");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a branch at `oid` and make it HEAD.
    pub fn checkout_new_branch(&self, name: &str, oid: Oid) {
        let commit = self.repo.find_commit(oid).expect("Failed to find commit");
        self.repo
            .branch(name, &commit, false)
            .expect("Failed to create branch");
        self.repo
            .set_head(&format!("refs/heads/{name}"))
            .expect("Failed to set HEAD");
    }
}
