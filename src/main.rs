//! standup - CLI entry point.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use tokio::time::timeout;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use standup::commit::{Commit, GroupingOptions, calculate_complexity, group_commits};
use standup::config::{Settings, credential_for};
use standup::git::{CollectOptions, collect_commits, day_window, open_repository, previous_working_day};
use standup::github::{
    DiffFetchOptions, GitHubClient, attach_diffs, diff_targets, fetch_diffs, get_github_token,
};
use standup::llm::{Provider, ProviderConfig};
use standup::pipeline::{Generation, GenerationRequest, generate_summary};
use standup::summary::{PromptOptions, build_grouped_prompt};

/// Summarize recent commits into a daily stand-up update.
#[derive(Parser, Debug)]
#[command(name = "standup")]
#[command(about = "Summarize recent commits, grouped by ticket, into a stand-up update")]
#[command(version)]
struct Cli {
    /// JSON file containing a commit list ("-" reads stdin)
    #[arg(long, conflicts_with_all = ["author", "date"])]
    input: Option<PathBuf>,

    /// Repository to collect commits from
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Only include commits authored by this email
    #[arg(long)]
    author: Option<String>,

    /// Day to report on (YYYY-MM-DD); defaults to the previous working day
    #[arg(long)]
    date: Option<NaiveDate>,

    /// LLM vendor: openai, anthropic (claude) or google (gemini)
    #[arg(long)]
    provider: Option<Provider>,

    /// Model override for the selected vendor
    #[arg(long)]
    model: Option<String>,

    /// Base URL ticket ids are appended to, e.g. https://acme.atlassian.net/browse
    #[arg(long)]
    ticket_base_url: Option<String>,

    /// Fetch missing diffs from this GitHub repository (owner/name)
    #[arg(long)]
    github_repo: Option<String>,

    /// Print grouping, complexity and prompt without calling the LLM
    #[arg(long)]
    dry_run: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let settings = Settings::from_env();
    let provider = cli.provider.unwrap_or(settings.provider);

    let mut commits = match &cli.input {
        Some(path) => read_commits(path)?,
        None => collect_local(&cli)?,
    };
    info!(count = commits.len(), "Loaded commits");

    if let Some(github_repo) = cli.github_repo.as_deref() {
        fetch_missing_diffs(&mut commits, github_repo).await?;
    }

    let prompt = PromptOptions {
        grouping: GroupingOptions {
            ticket_base_url: cli.ticket_base_url.clone().or(settings.ticket_base_url.clone()),
            ..Default::default()
        },
        ..Default::default()
    };

    if cli.dry_run {
        print_dry_run(&commits, &prompt);
        return Ok(());
    }

    let request = GenerationRequest {
        provider,
        credential: credential_for(provider),
        provider_config: ProviderConfig {
            model: cli.model.clone().or(settings.model.clone()),
            ..Default::default()
        },
        prompt,
    };

    let generation = timeout(settings.timeout, generate_summary(&commits, &request))
        .await
        .with_context(|| {
            format!(
                "Summary generation timed out after {}s",
                settings.timeout.as_secs()
            )
        })?
        .with_context(|| format!("Failed to generate stand-up summary with {provider}"))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&generation.summary)
            .context("Failed to serialize summary")?;
        println!("{json}");
    } else {
        print_summary(&generation);
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read a JSON commit list from a file or stdin.
fn read_commits(path: &Path) -> Result<Vec<Commit>> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read commits from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid commit list", path.display()))
}

/// Collect the report day's commits from the local repository.
fn collect_local(cli: &Cli) -> Result<Vec<Commit>> {
    let repo = open_repository(&cli.repo).with_context(|| {
        format!("{} is not inside a git repository", cli.repo.display())
    })?;

    let day = cli
        .date
        .unwrap_or_else(|| previous_working_day(Local::now().date_naive()));
    let (since, until) = day_window(day);

    let repository = cli.github_repo.clone().unwrap_or_else(|| {
        repo.workdir()
            .and_then(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "repository".to_string())
    });

    info!(%day, "Collecting commits");

    let options = CollectOptions {
        since,
        until,
        author_email: cli.author.clone(),
        repository,
    };
    collect_commits(&repo, &options).context("Failed to collect commits")
}

/// Fill in diffs for commits that arrived without one.
async fn fetch_missing_diffs(commits: &mut [Commit], github_repo: &str) -> Result<()> {
    let targets = diff_targets(commits, Some(github_repo));
    if targets.is_empty() {
        return Ok(());
    }

    let token = match get_github_token() {
        Ok(token) => Some(token),
        Err(e) => {
            warn!("{e}. Fetching diffs unauthenticated.");
            None
        }
    };
    let client = GitHubClient::new(token).context("Failed to create GitHub client")?;

    let diffs = fetch_diffs(&client, &targets, &DiffFetchOptions::default()).await;
    let attached = attach_diffs(commits, diffs);
    info!(requested = targets.len(), attached, "Fetched commit diffs");
    Ok(())
}

fn print_dry_run(commits: &[Commit], options: &PromptOptions) {
    let grouping = group_commits(commits, &options.grouping);

    println!("--- Grouping ---\n");
    for group in &grouping.groups {
        println!(
            "{} ({} commits, +{}/-{})",
            group.ticket_id,
            group.commits.len(),
            group.additions,
            group.deletions
        );
    }
    println!("Untracked commits: {}", grouping.orphans.len());

    let complexity = calculate_complexity(grouping.unique_commits());
    println!(
        "Complexity: {} (score {}, {} files changed)",
        complexity.level,
        complexity.score(),
        complexity.files_changed
    );

    println!("\n--- Prompt ---\n");
    println!("{}", build_grouped_prompt(&grouping, options));
}

fn print_summary(generation: &Generation<'_>) {
    let summary = &generation.summary;
    println!("{}\n", summary.summary);

    for point in &summary.bullet_points {
        println!("- {point}");
    }

    if !summary.tickets.is_empty() {
        println!();
        for ticket in &summary.tickets {
            let url = generation
                .grouping
                .group(&ticket.ticket_id)
                .and_then(|g| g.url.as_deref());
            match url {
                Some(url) => println!("{} ({url}): {}", ticket.ticket_id, ticket.summary),
                None => println!("{}: {}", ticket.ticket_id, ticket.summary),
            }
            for point in &ticket.bullet_points {
                println!("  - {point}");
            }
        }
    }

    if !summary.untracked.is_empty() {
        println!("\nOther work:");
        for item in &summary.untracked {
            println!("  - {item}");
        }
    }

    if !summary.highlights.is_empty() {
        println!("\nHighlights:");
        for item in &summary.highlights {
            println!("  * {item}");
        }
    }

    println!(
        "\n({} commits, complexity: {})",
        generation.complexity.total_commits, generation.complexity.level
    );
}
