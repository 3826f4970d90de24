//! Stand-up summary types and prompt construction.

pub mod prompt;

use serde::{Deserialize, Serialize};

pub use prompt::{PromptOptions, SYSTEM_PROMPT, build_grouped_prompt, build_prompt};

/// Summary returned for an empty commit list.
pub const NO_ACTIVITY_SUMMARY: &str = "No commits found for the previous working day.";

/// Stand-up summary produced by a language model.
///
/// Every provider returns this shape regardless of how the vendor wrapped
/// its reply. `bullet_points` is the flat legacy shape; `tickets` carries the
/// per-ticket breakdown when the model produced one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub summary: String,
    #[serde(default)]
    pub bullet_points: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub tickets: Vec<TicketSummary>,
    /// Work that could not be tied to any ticket.
    #[serde(default)]
    pub untracked: Vec<String>,
}

impl SummaryResult {
    /// Canned result for a day without commits.
    pub fn no_activity() -> Self {
        Self {
            summary: NO_ACTIVITY_SUMMARY.to_string(),
            ..Default::default()
        }
    }
}

/// Narrative for a single ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketSummary {
    pub ticket_id: String,
    pub summary: String,
    #[serde(default)]
    pub bullet_points: Vec<String>,
    #[serde(default)]
    pub code_insights: Vec<String>,
    #[serde(default)]
    pub files_changed: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_activity_shape() {
        let result = SummaryResult::no_activity();
        assert_eq!(result.summary, NO_ACTIVITY_SUMMARY);
        assert!(result.bullet_points.is_empty());
        assert!(result.highlights.is_empty());
        assert!(result.tickets.is_empty());
        assert!(result.untracked.is_empty());
    }

    #[test]
    fn test_serializes_with_contract_field_names() {
        let result = SummaryResult {
            summary: "Shipped login".to_string(),
            tickets: vec![TicketSummary {
                ticket_id: "SC-1".to_string(),
                summary: "Login".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let value = serde_json::to_value(&result).unwrap();
        assert!(value["bulletPoints"].is_array());
        assert!(value["untracked"].is_array());
        assert_eq!(value["tickets"][0]["ticketId"], "SC-1");
        assert!(value["tickets"][0]["codeInsights"].is_array());
        assert!(value["tickets"][0]["filesChanged"].is_array());
    }
}
