//! Prompt construction for stand-up summaries.

use std::fmt::Write;

use crate::commit::complexity::calculate_complexity;
use crate::commit::diff::{DiffFormatOptions, format_diff};
use crate::commit::grouping::{CommitGrouping, GroupingOptions, TicketGroup, group_commits};
use crate::commit::model::Commit;

/// System instruction sent alongside every prompt.
pub const SYSTEM_PROMPT: &str = "You write concise daily stand-up summaries for software developers. \
Respond with a single valid JSON object only. Do not wrap it in markdown code fences and do not add commentary.";

/// Rendering knobs for the prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptOptions {
    pub diff: DiffFormatOptions,
    /// Used when grouping has to happen inside [`build_prompt`].
    pub grouping: GroupingOptions,
}

/// Build the prompt from a flat commit list, grouping it first.
///
/// Produces the same text as grouping with `options.grouping` and calling
/// [`build_grouped_prompt`].
pub fn build_prompt(commits: &[Commit], options: &PromptOptions) -> String {
    let grouping = group_commits(commits, &options.grouping);
    build_grouped_prompt(&grouping, options)
}

/// Build the prompt from pre-computed ticket groups and orphan commits.
pub fn build_grouped_prompt(grouping: &CommitGrouping<'_>, options: &PromptOptions) -> String {
    let metrics = calculate_complexity(grouping.unique_commits());

    let mut tickets_section = String::new();
    if grouping.groups.is_empty() {
        tickets_section.push_str("(no ticketed work)\n");
    }
    for group in &grouping.groups {
        render_group(&mut tickets_section, group, &options.diff);
    }

    let mut other_section = String::new();
    if grouping.orphans.is_empty() {
        other_section.push_str("(none)\n");
    }
    for commit in &grouping.orphans {
        render_commit(&mut other_section, commit);
        if let Some(diff) = &commit.diff {
            indent_into(&mut other_section, &format_diff(diff, &options.diff));
        }
    }

    let ticket_ids = grouping.ticket_ids();
    let ticket_rule = if ticket_ids.is_empty() {
        r#"There are no tickets in this activity, so "tickets" must be an empty array."#.to_string()
    } else {
        let keys = ticket_ids
            .iter()
            .map(|id| format!("\"{id}\""))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            r#"The "tickets" array must contain exactly one entry per ticket, using these ticketId values: {keys}."#
        )
    };
    let example_ticket = ticket_ids.first().copied().unwrap_or("PROJ-123");

    format!(
        r#"You are helping a software developer prepare for their daily stand-up meeting.
Below is the work they committed on the previous working day, organized by issue-tracker ticket.

## Activity Overview
{commits} commits, +{additions}/-{deletions} lines, {files} files changed (complexity: {level}, score {score})

## Tickets
{tickets_section}
## Other Work
Commits not linked to any ticket:
{other_section}
## Instructions
1. Organize the answer by ticket: summarize each ticket listed above in its own entry.
2. Synthesize what was accomplished and why it matters. Do NOT restate commit messages verbatim.
3. Use the diffs to call out notable implementation details as short code insights.
4. Describe the "Other Work" commits in "untracked", one short sentence each.
5. Write for teammates listening at a stand-up: short, concrete, past tense.
6. Scale the length of the summary to the complexity of the work.

## Output Format
Respond with ONLY a JSON object (no markdown, no explanation) with exactly these fields:
{{
  "summary": "One or two sentence overview of the day",
  "bulletPoints": ["Flat list of the main accomplishments"],
  "highlights": ["The most notable outcomes"],
  "tickets": [
    {{
      "ticketId": "{example_ticket}",
      "summary": "What was done for this ticket",
      "bulletPoints": ["Specific accomplishment"],
      "codeInsights": ["Notable code change"],
      "filesChanged": ["path/to/file"]
    }}
  ],
  "untracked": ["Description of work without a ticket"]
}}
{ticket_rule}"#,
        commits = metrics.total_commits,
        additions = metrics.additions,
        deletions = metrics.deletions,
        files = metrics.files_changed,
        level = metrics.level,
        score = metrics.score(),
    )
}

fn render_group(out: &mut String, group: &TicketGroup<'_>, diff_options: &DiffFormatOptions) {
    let _ = writeln!(out, "### {}", group.ticket_id);
    if let Some(url) = &group.url {
        let _ = writeln!(out, "URL: {url}");
    }
    let _ = writeln!(
        out,
        "Stats: {} commits, +{}/-{} lines, {} files",
        group.commits.len(),
        group.additions,
        group.deletions,
        group.file_count()
    );

    if !group.pull_requests.is_empty() {
        out.push_str("Pull requests:\n");
        for pr in &group.pull_requests {
            let _ = writeln!(
                out,
                "- #{} {} ({})",
                pr.number,
                sanitize_for_prompt(&pr.title),
                pr.state
            );
        }
    }

    out.push_str("Commits:\n");
    for commit in &group.commits {
        render_commit(out, commit);
    }

    if !group.diffs.is_empty() {
        out.push_str("Diffs:\n");
        for entry in &group.diffs {
            let short = entry.sha.get(..7).unwrap_or(entry.sha);
            let _ = writeln!(out, "  Commit {short}:");
            indent_into(out, &format_diff(entry.diff, diff_options));
        }
    }
    out.push('\n');
}

fn render_commit(out: &mut String, commit: &Commit) {
    let _ = writeln!(
        out,
        "- {} {} (+{}/-{}, {} files)",
        commit.short_sha(),
        sanitize_for_prompt(commit.subject()),
        commit.additions,
        commit.deletions,
        commit.files_changed
    );
}

fn indent_into(out: &mut String, text: &str) {
    for line in text.lines() {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
}

/// Sanitize a single line of user-authored text (commit subject, PR title).
///
/// Neutralizes code fences and markdown headers so the text cannot
/// restructure the prompt, and collapses it to one line.
pub fn sanitize_for_prompt(text: &str) -> String {
    remove_control_chars(text)
        .replace("```", "'''")
        .replace("##", "//")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sanitize multi-line text such as a patch, keeping its line structure.
pub fn sanitize_block(text: &str) -> String {
    remove_control_chars(text).replace("```", "'''")
}

/// Remove control characters except newlines and tabs.
fn remove_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}
