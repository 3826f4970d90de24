//! Turn free-form model output into a [`SummaryResult`].
//!
//! Model output is untrusted text. Each field is coerced on its own, so one
//! malformed field never discards the rest, and text without any JSON still
//! yields a usable summary.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::llm::json::extract_json_object;
use crate::summary::{SummaryResult, TicketSummary};

/// Characters of raw text kept as the summary when no JSON can be recovered.
pub const FALLBACK_SUMMARY_CHARS: usize = 500;

/// Normalize raw model output. Never fails.
pub fn normalize_summary(raw: &str) -> SummaryResult {
    match extract_json_object(raw) {
        Some(object) if has_summary_fields(&object) => summary_from_object(&object),
        Some(_) => {
            warn!(
                response_len = raw.len(),
                "Model response JSON had no summary fields, using raw text as summary"
            );
            raw_text_summary(raw)
        }
        None => {
            warn!(
                response_len = raw.len(),
                "Model response contained no JSON object, using raw text as summary"
            );
            raw_text_summary(raw)
        }
    }
}

const SUMMARY_KEYS: &[&str] = &[
    "summary",
    "bulletPoints",
    "bullet_points",
    "highlights",
    "tickets",
    "untracked",
];

/// An object like `{}` found inside prose is not a summary.
fn has_summary_fields(object: &Map<String, Value>) -> bool {
    SUMMARY_KEYS.iter().any(|key| object.contains_key(*key))
}

fn raw_text_summary(raw: &str) -> SummaryResult {
    SummaryResult {
        summary: raw.trim().chars().take(FALLBACK_SUMMARY_CHARS).collect(),
        ..Default::default()
    }
}

fn summary_from_object(object: &Map<String, Value>) -> SummaryResult {
    let tickets = ticket_list(field(object, "tickets", "tickets"));
    debug!(tickets = tickets.len(), "Parsed model response");

    SummaryResult {
        summary: string_value(field(object, "summary", "summary")),
        bullet_points: string_list(field(object, "bulletPoints", "bullet_points")),
        highlights: string_list(field(object, "highlights", "highlights")),
        tickets,
        untracked: string_list(field(object, "untracked", "untracked")),
    }
}

/// Look up a camelCase key, accepting its snake_case spelling as well.
fn field<'a>(object: &'a Map<String, Value>, key: &str, alias: &str) -> Option<&'a Value> {
    object.get(key).or_else(|| object.get(alias))
}

fn string_value(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Strings of an array; non-arrays and non-string items are dropped.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Ticket entries of an array; entries without a ticket ID are dropped.
fn ticket_list(value: Option<&Value>) -> Vec<TicketSummary> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|entry| {
            let ticket_id = string_value(field(entry, "ticketId", "ticket_id"));
            if ticket_id.is_empty() {
                debug!("Skipping ticket entry without ticketId");
                return None;
            }
            Some(TicketSummary {
                ticket_id,
                summary: string_value(field(entry, "summary", "summary")),
                bullet_points: string_list(field(entry, "bulletPoints", "bullet_points")),
                code_insights: string_list(field(entry, "codeInsights", "code_insights")),
                files_changed: string_list(field(entry, "filesChanged", "files_changed")),
            })
        })
        .collect()
}
