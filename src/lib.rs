//! standup - Groups recent commits by issue-tracker ticket and asks an LLM for a
//! daily stand-up summary.
//!
//! # Overview
//!
//! Commits (from a local repository, a JSON export, or GitHub) are grouped by
//! the ticket identifiers found in their branch names, pull requests and
//! messages. The groups, orphan commits, bounded diff excerpts and a
//! complexity estimate are rendered into a single prompt that is sent to one
//! of several LLM vendors. Whatever the vendor returns is normalized into a
//! [`SummaryResult`].

pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod llm;
pub mod pipeline;
pub mod summary;
pub mod ticket;

// Re-export commonly used types
pub use commit::{Commit, CommitGrouping, ComplexityLevel, ComplexityMetrics, TicketGroup};
pub use error::{ConfigError, GitError, GitHubError, LlmError};
pub use llm::{LanguageModel, Provider, ProviderConfig};
pub use pipeline::{Generation, GenerationRequest, generate_summary};
pub use summary::{SummaryResult, TicketSummary};
