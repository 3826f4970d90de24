//! Work complexity estimate over a commit list.
//!
//! The weights and thresholds are product-tuned constants, not derived from
//! any model of effort. Change them together.

use std::fmt;

use serde::Serialize;

use crate::commit::model::Commit;

pub const COMMIT_WEIGHT: f64 = 2.0;
pub const ADDITIONS_PER_POINT: f64 = 50.0;
pub const DELETIONS_PER_POINT: f64 = 100.0;
pub const FILE_WEIGHT: f64 = 1.0;

pub const MODERATE_THRESHOLD: f64 = 5.0;
pub const COMPLEX_THRESHOLD: f64 = 15.0;
pub const MAJOR_THRESHOLD: f64 = 30.0;

/// Discretized complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Simple,
    Moderate,
    Complex,
    Major,
}

impl ComplexityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
            Self::Major => "major",
        }
    }

    fn from_score(score: f64) -> Self {
        if score < MODERATE_THRESHOLD {
            Self::Simple
        } else if score < COMPLEX_THRESHOLD {
            Self::Moderate
        } else if score < MAJOR_THRESHOLD {
            Self::Complex
        } else {
            Self::Major
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate size of a body of work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityMetrics {
    pub total_commits: u64,
    pub additions: u64,
    pub deletions: u64,
    pub files_changed: u64,
    /// Unrounded weighted score; the level is derived from this.
    pub raw_score: f64,
    pub level: ComplexityLevel,
}

impl ComplexityMetrics {
    /// Score rounded for display.
    pub fn score(&self) -> u64 {
        self.raw_score.round() as u64
    }
}

/// Compute complexity metrics for a list of commits.
pub fn calculate_complexity<'a, I>(commits: I) -> ComplexityMetrics
where
    I: IntoIterator<Item = &'a Commit>,
{
    let (mut total_commits, mut additions, mut deletions, mut files_changed) = (0u64, 0, 0, 0);
    for commit in commits {
        total_commits += 1;
        additions += commit.additions;
        deletions += commit.deletions;
        files_changed += commit.files_changed;
    }

    let raw_score = total_commits as f64 * COMMIT_WEIGHT
        + additions as f64 / ADDITIONS_PER_POINT
        + deletions as f64 / DELETIONS_PER_POINT
        + files_changed as f64 * FILE_WEIGHT;

    ComplexityMetrics {
        total_commits,
        additions,
        deletions,
        files_changed,
        raw_score,
        level: ComplexityLevel::from_score(raw_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::model::CommitAuthor;
    use chrono::Utc;

    fn commit(additions: u64, deletions: u64, files_changed: u64) -> Commit {
        Commit {
            sha: "abc".to_string(),
            author: CommitAuthor::default(),
            date: Utc::now(),
            message: "work".to_string(),
            repository: String::new(),
            additions,
            deletions,
            files_changed,
            branch: None,
            pull_request: None,
            diff: None,
        }
    }

    #[test]
    fn test_no_commits_is_simple() {
        let commits: Vec<Commit> = Vec::new();
        let metrics = calculate_complexity(&commits);
        assert_eq!(metrics.score(), 0);
        assert_eq!(metrics.level, ComplexityLevel::Simple);
    }

    #[test]
    fn test_weighted_score_rounds_for_display() {
        // 10 commits, 600 additions, 50 deletions, 20 files.
        let mut commits = vec![commit(600, 50, 20)];
        commits.extend((0..9).map(|_| commit(0, 0, 0)));

        let metrics = calculate_complexity(&commits);
        assert_eq!(metrics.total_commits, 10);
        assert!((metrics.raw_score - 52.5).abs() < f64::EPSILON);
        assert_eq!(metrics.score(), 53);
        assert_eq!(metrics.level, ComplexityLevel::Major);
    }

    #[test]
    fn test_thresholds_use_unrounded_score() {
        // 2 commits (4) + 49 additions (0.98) = 4.98, rounds to 5 but stays simple.
        let commits = vec![commit(49, 0, 0), commit(0, 0, 0)];
        let metrics = calculate_complexity(&commits);
        assert_eq!(metrics.score(), 5);
        assert_eq!(metrics.level, ComplexityLevel::Simple);
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(ComplexityLevel::from_score(5.0), ComplexityLevel::Moderate);
        assert_eq!(ComplexityLevel::from_score(14.9), ComplexityLevel::Moderate);
        assert_eq!(ComplexityLevel::from_score(15.0), ComplexityLevel::Complex);
        assert_eq!(ComplexityLevel::from_score(30.0), ComplexityLevel::Major);
    }
}
