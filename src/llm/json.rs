//! Shared JSON extraction utilities for LLM responses.
//!
//! Models often return JSON wrapped in markdown code fences or surrounded by
//! conversational text. Every provider funnels its generated text through
//! [`extract_json_object`].

use serde_json::{Map, Value};

/// Remove markdown code fences around (or embedded in) a response.
///
/// Handles a leading ` ```json ` / ` ``` ` marker with a trailing ` ``` `, and
/// a fenced block in the middle of prose. Text without fences is returned
/// trimmed.
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        // Drop the info string (`json`, `JSON`, ...) up to the first newline.
        let body = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
        let body = body.trim_end();
        let body = body.strip_suffix("```").unwrap_or(body);
        return body.trim();
    }

    if let Some(start) = trimmed.find("```")
        && let Some(end) = trimmed[start + 3..].find("```")
    {
        let inner = &trimmed[start + 3..start + 3 + end];
        let inner = inner
            .find('\n')
            .filter(|&newline| !inner[..newline].contains('{'))
            .map(|newline| &inner[newline + 1..])
            .unwrap_or(inner);
        return inner.trim();
    }

    trimmed
}

/// Best-effort extraction of a JSON object from free text.
///
/// Tries, in order:
/// 1. The greedy span from the first `{` to the last `}` of the fence-stripped text
/// 2. The whole fence-stripped text
/// 3. Balanced-brace extraction starting at each `{`
///
/// Returns `None` when no JSON object can be recovered.
pub fn extract_json_object(response: &str) -> Option<Map<String, Value>> {
    let cleaned = strip_code_fences(response);

    if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}'))
        && start < end
        && let Some(object) = parse_object(&cleaned[start..=end])
    {
        return Some(object);
    }

    if let Some(object) = parse_object(cleaned) {
        return Some(object);
    }

    find_valid_json_object(cleaned)
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Find a valid JSON object in a string using proper brace matching.
///
/// Iterates through every `{` in the input. For each one, first tries a
/// streaming `serde_json` parse (which tolerates trailing text), then falls
/// back to balanced-brace extraction with string-escape awareness.
fn find_valid_json_object(text: &str) -> Option<Map<String, Value>> {
    for (start_idx, _) in text.match_indices('{') {
        let candidate = &text[start_idx..];

        let mut stream = serde_json::Deserializer::from_str(candidate).into_iter::<Value>();
        if let Some(Ok(Value::Object(map))) = stream.next() {
            return Some(map);
        }

        if let Some(span) = extract_balanced_braces(candidate)
            && let Some(map) = parse_object(span)
        {
            return Some(map);
        }
    }

    None
}

/// Extract a substring with balanced braces starting from the first `{`.
///
/// Tracks brace depth while respecting JSON string literals (including
/// escaped characters), so `{"msg": "use { and } carefully"}` is handled
/// correctly.
fn extract_balanced_braces(text: &str) -> Option<&str> {
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (idx, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..=idx]);
                }
            }
            _ => {}
        }
    }

    None
}
