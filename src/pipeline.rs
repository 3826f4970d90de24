//! End-to-end summary generation.
//!
//! commits → ticket grouping → prompt → one model call → normalized summary.

use serde::Serialize;
use tracing::info;

use crate::commit::complexity::{ComplexityMetrics, calculate_complexity};
use crate::commit::grouping::{CommitGrouping, group_commits};
use crate::commit::model::Commit;
use crate::error::LlmError;
use crate::llm::provider::{LanguageModel, Provider, ProviderConfig, build_model};
use crate::summary::prompt::{PromptOptions, build_grouped_prompt};
use crate::summary::SummaryResult;

/// Everything needed to generate a summary with a vendor.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub provider: Provider,
    /// API key; checked before any network call.
    pub credential: Option<String>,
    pub provider_config: ProviderConfig,
    pub prompt: PromptOptions,
}

impl GenerationRequest {
    pub fn new(provider: Provider, credential: Option<String>) -> Self {
        Self {
            provider,
            credential,
            provider_config: ProviderConfig::default(),
            prompt: PromptOptions::default(),
        }
    }
}

/// Outcome of a generation: the summary plus the grouping it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct Generation<'a> {
    pub summary: SummaryResult,
    pub grouping: CommitGrouping<'a>,
    pub complexity: ComplexityMetrics,
}

impl<'a> Generation<'a> {
    fn no_activity() -> Self {
        Self {
            summary: SummaryResult::no_activity(),
            grouping: CommitGrouping::default(),
            complexity: calculate_complexity(std::iter::empty::<&Commit>()),
        }
    }
}

/// Generate a stand-up summary for a commit list with the requested vendor.
///
/// An empty commit list short-circuits to the canned "no activity" summary
/// without validating credentials or touching the network.
pub async fn generate_summary<'a>(
    commits: &'a [Commit],
    request: &GenerationRequest,
) -> Result<Generation<'a>, LlmError> {
    if commits.is_empty() {
        info!("No commits to summarize");
        return Ok(Generation::no_activity());
    }

    let model = build_model(
        request.provider,
        request.credential.as_deref(),
        request.provider_config.clone(),
    )?;
    generate_with_model(commits, model.as_ref(), &request.prompt).await
}

/// Generate a summary with an already-built model.
pub async fn generate_with_model<'a>(
    commits: &'a [Commit],
    model: &dyn LanguageModel,
    options: &PromptOptions,
) -> Result<Generation<'a>, LlmError> {
    let grouping = group_commits(commits, &options.grouping);
    generate_from_grouping(grouping, model, options).await
}

/// Generate a summary from groups the caller computed itself.
pub async fn generate_from_grouping<'a>(
    grouping: CommitGrouping<'a>,
    model: &dyn LanguageModel,
    options: &PromptOptions,
) -> Result<Generation<'a>, LlmError> {
    if grouping.is_empty() {
        info!("No commits to summarize");
        return Ok(Generation::no_activity());
    }

    let complexity = calculate_complexity(grouping.unique_commits());
    let prompt = build_grouped_prompt(&grouping, options);

    info!(
        provider = %model.provider(),
        tickets = grouping.groups.len(),
        orphans = grouping.orphans.len(),
        complexity = %complexity.level,
        prompt_len = prompt.len(),
        "Generating stand-up summary"
    );

    let summary = model.summarize(&prompt).await?;

    Ok(Generation {
        summary,
        grouping,
        complexity,
    })
}
