//! Commit records and the transformations applied before prompting.

pub mod complexity;
pub mod diff;
pub mod grouping;
pub mod model;

pub use complexity::{ComplexityLevel, ComplexityMetrics, calculate_complexity};
pub use diff::{DiffFormatOptions, format_diff};
pub use grouping::{
    CommitGrouping, GroupDiff, GroupingOptions, TicketGroup, commit_tickets, group_commits,
};
pub use model::{
    Commit, CommitAuthor, CommitDiff, FileDiff, FileStatus, PullRequestRef, PullRequestState,
};
