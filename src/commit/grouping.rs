//! Partition commits into ticket groups.
//!
//! A commit joins every ticket it mentions (through its branch, its PR's head
//! branch, or its message), so groups form a many-to-many join from ticket ID
//! to borrowed commits. Commits without any ticket are orphans.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::commit::model::{Commit, CommitDiff, PullRequestRef};
use crate::ticket::{extract_branch_tickets, extract_tickets, ticket_url};

/// Default cap on diffs carried per group into the prompt.
pub const DEFAULT_MAX_DIFFS_PER_GROUP: usize = 3;

/// Knobs for [`group_commits`].
#[derive(Debug, Clone)]
pub struct GroupingOptions {
    /// Diffs kept per group; later ones are dropped silently.
    pub max_diffs_per_group: usize,
    /// Issue tracker base, e.g. `https://acme.atlassian.net/browse`.
    pub ticket_base_url: Option<String>,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            max_diffs_per_group: DEFAULT_MAX_DIFFS_PER_GROUP,
            ticket_base_url: None,
        }
    }
}

/// A diff carried through a group, tagged with its commit.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GroupDiff<'a> {
    pub sha: &'a str,
    pub diff: &'a CommitDiff,
}

/// Everything known about one ticket's work.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketGroup<'a> {
    pub ticket_id: String,
    pub url: Option<String>,
    /// Member commits in input order.
    pub commits: Vec<&'a Commit>,
    /// Pull requests, unique by number.
    pub pull_requests: Vec<&'a PullRequestRef>,
    /// Changed file paths, unique, in first-seen order.
    pub files: Vec<&'a str>,
    pub additions: u64,
    pub deletions: u64,
    pub diffs: Vec<GroupDiff<'a>>,
    #[serde(skip)]
    pr_numbers: HashSet<u64>,
    #[serde(skip)]
    file_set: HashSet<&'a str>,
}

impl<'a> TicketGroup<'a> {
    fn new(ticket_id: String, url: Option<String>) -> Self {
        Self {
            ticket_id,
            url,
            commits: Vec::new(),
            pull_requests: Vec::new(),
            files: Vec::new(),
            additions: 0,
            deletions: 0,
            diffs: Vec::new(),
            pr_numbers: HashSet::new(),
            file_set: HashSet::new(),
        }
    }

    /// Files touched by the group: distinct paths from attached diffs plus
    /// the reported counts of member commits that carry no diff.
    pub fn file_count(&self) -> u64 {
        let without_diff: u64 = self
            .commits
            .iter()
            .filter(|c| c.diff.is_none())
            .map(|c| c.files_changed)
            .sum();
        self.files.len() as u64 + without_diff
    }

    fn push(&mut self, commit: &'a Commit, max_diffs: usize) {
        self.commits.push(commit);
        self.additions += commit.additions;
        self.deletions += commit.deletions;

        if let Some(pr) = &commit.pull_request
            && self.pr_numbers.insert(pr.number)
        {
            self.pull_requests.push(pr);
        }

        if let Some(diff) = &commit.diff {
            for file in &diff.files {
                if self.file_set.insert(file.filename.as_str()) {
                    self.files.push(file.filename.as_str());
                }
            }
            if self.diffs.len() < max_diffs {
                self.diffs.push(GroupDiff {
                    sha: &commit.sha,
                    diff,
                });
            }
        }
    }
}

/// Result of grouping: ticket groups in first-seen order plus orphans in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitGrouping<'a> {
    pub groups: Vec<TicketGroup<'a>>,
    pub orphans: Vec<&'a Commit>,
}

impl CommitGrouping<'_> {
    pub fn ticket_ids(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.ticket_id.as_str()).collect()
    }

    pub fn group(&self, ticket_id: &str) -> Option<&TicketGroup<'_>> {
        self.groups.iter().find(|g| g.ticket_id == ticket_id)
    }

    /// Every distinct commit across groups and orphans, first appearance wins.
    pub fn unique_commits(&self) -> Vec<&Commit> {
        let mut seen = HashSet::new();
        self.groups
            .iter()
            .flat_map(|g| g.commits.iter().copied())
            .chain(self.orphans.iter().copied())
            .filter(|&c| seen.insert(c.sha.as_str()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.orphans.is_empty()
    }
}

/// Tickets a single commit belongs to.
///
/// Sources in order: the commit's branch, its PR's head branch, its message.
pub fn commit_tickets(commit: &Commit) -> Vec<String> {
    let pr_branch = commit
        .pull_request
        .as_ref()
        .and_then(|pr| pr.head_branch.as_deref());

    let candidates = commit
        .branch
        .as_deref()
        .map(extract_branch_tickets)
        .into_iter()
        .flatten()
        .chain(pr_branch.map(extract_branch_tickets).into_iter().flatten())
        .chain(extract_tickets(&commit.message));

    let mut seen = HashSet::new();
    candidates.filter(|t| seen.insert(t.clone())).collect()
}

/// Group commits by ticket.
pub fn group_commits<'a>(commits: &'a [Commit], options: &GroupingOptions) -> CommitGrouping<'a> {
    let mut grouping = CommitGrouping::default();
    let mut index: HashMap<String, usize> = HashMap::new();

    for commit in commits {
        let tickets = commit_tickets(commit);
        if tickets.is_empty() {
            grouping.orphans.push(commit);
            continue;
        }

        for ticket in tickets {
            let slot = match index.get(&ticket) {
                Some(&slot) => slot,
                None => {
                    let url = options
                        .ticket_base_url
                        .as_deref()
                        .map(|base| ticket_url(base, &ticket));
                    grouping.groups.push(TicketGroup::new(ticket.clone(), url));
                    index.insert(ticket, grouping.groups.len() - 1);
                    grouping.groups.len() - 1
                }
            };
            grouping.groups[slot].push(commit, options.max_diffs_per_group);
        }
    }

    debug!(
        groups = grouping.groups.len(),
        orphans = grouping.orphans.len(),
        "Grouped commits by ticket"
    );

    grouping
}
