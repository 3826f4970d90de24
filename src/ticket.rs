//! Issue-tracker ticket extraction.
//!
//! Tickets look like `PROJECT-123`: a letter, one or more letters or digits,
//! a hyphen and a number. Matching is case-insensitive and results are
//! uppercased. All matching goes through `find_iter`/`captures` on shared
//! compiled patterns, so no match position survives between calls.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex_lite::Regex;

static TICKET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[A-Z][A-Z0-9]+-\d+").expect("ticket pattern is valid"));

/// Ticket directly after the start or a path separator, followed by `-`, `/` or the end.
static BRANCH_TICKET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|/)([A-Z][A-Z0-9]+-\d+)(?:[-/]|$)").expect("branch pattern is valid")
});

/// Insertion-ordered set of ticket IDs.
#[derive(Debug, Default)]
struct TicketSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl TicketSet {
    fn insert(&mut self, ticket: String) {
        if self.seen.insert(ticket.clone()) {
            self.ordered.push(ticket);
        }
    }

    fn extend<I: IntoIterator<Item = String>>(&mut self, tickets: I) {
        for ticket in tickets {
            self.insert(ticket);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

/// Extract every unique ticket ID from free text, uppercased, in order of first occurrence.
pub fn extract_tickets(text: &str) -> Vec<String> {
    let mut set = TicketSet::default();
    set.extend(
        TICKET_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().to_uppercase()),
    );
    set.into_vec()
}

/// Whether the text mentions at least one ticket.
pub fn contains_ticket(text: &str) -> bool {
    TICKET_PATTERN.is_match(text)
}

/// The primary ticket of a branch name.
///
/// Prefers a ticket sitting right after a path separator (`feature/SC-12-login`),
/// falling back to the first ticket-looking token anywhere in the name.
pub fn extract_branch_ticket(branch: &str) -> Option<String> {
    if let Some(caps) = BRANCH_TICKET_PATTERN.captures(branch)
        && let Some(ticket) = caps.get(1)
    {
        return Some(ticket.as_str().to_uppercase());
    }

    TICKET_PATTERN
        .find(branch)
        .map(|m| m.as_str().to_uppercase())
}

/// All tickets of a branch name: the primary ticket first, then any others.
pub fn extract_branch_tickets(branch: &str) -> Vec<String> {
    let mut set = TicketSet::default();
    if let Some(primary) = extract_branch_ticket(branch) {
        set.insert(primary);
    }
    set.extend(extract_tickets(branch));
    set.into_vec()
}

/// Text sources that may mention tickets, in priority order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketSources<'a> {
    pub branch: Option<&'a str>,
    pub pr_title: Option<&'a str>,
    pub messages: &'a [&'a str],
}

/// Extract tickets from a bundle of sources.
///
/// Order: branch (anchored, then general), PR title, then each message.
pub fn extract_from_sources(sources: &TicketSources<'_>) -> Vec<String> {
    let mut set = TicketSet::default();

    if let Some(branch) = sources.branch {
        set.extend(extract_branch_tickets(branch));
    }
    if let Some(title) = sources.pr_title {
        set.extend(extract_tickets(title));
    }
    for message in sources.messages {
        set.extend(extract_tickets(message));
    }

    set.into_vec()
}

/// Link to a ticket: `{base}/{TICKET}` with trailing slashes of the base removed.
pub fn ticket_url(base_url: &str, ticket: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), ticket)
}
