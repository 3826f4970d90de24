//! Bounded rendering of commit diffs for prompt inclusion.

use std::fmt::Write;

use crate::commit::model::{CommitDiff, FileDiff};
use crate::summary::prompt::sanitize_block;

/// Marker appended to a patch that was cut short.
pub const TRUNCATION_MARKER: &str = "... (truncated)";

/// Limits applied when rendering a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffFormatOptions {
    /// Files rendered per diff; the rest are summarized in a trailing note.
    pub max_files: usize,
    /// Patch lines rendered per file.
    pub max_patch_lines: usize,
}

impl Default for DiffFormatOptions {
    fn default() -> Self {
        Self {
            max_files: 3,
            max_patch_lines: 30,
        }
    }
}

/// Render the first `max_files` files of a diff with truncated patches.
pub fn format_diff(diff: &CommitDiff, options: &DiffFormatOptions) -> String {
    let mut out = String::new();

    for file in diff.files.iter().take(options.max_files) {
        format_file(&mut out, file, options.max_patch_lines);
    }

    let omitted = diff.files.len().saturating_sub(options.max_files);
    if omitted > 0 {
        let noun = if omitted == 1 { "file" } else { "files" };
        let _ = writeln!(out, "... and {omitted} more {noun} not shown");
    }

    out
}

fn format_file(out: &mut String, file: &FileDiff, max_lines: usize) {
    let _ = writeln!(
        out,
        "File: {} ({}, +{}/-{})",
        file.filename, file.status, file.additions, file.deletions
    );

    let Some(patch) = file.patch.as_deref().filter(|p| !p.trim().is_empty()) else {
        return;
    };

    let patch = sanitize_block(patch);
    let total = patch.lines().count();

    out.push_str("```diff\n");
    for line in patch.lines().take(max_lines) {
        out.push_str(line);
        out.push('\n');
    }
    if total > max_lines {
        out.push_str(TRUNCATION_MARKER);
        out.push('\n');
    }
    out.push_str("```\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::model::FileStatus;

    fn file(name: &str, patch: Option<String>) -> FileDiff {
        FileDiff {
            filename: name.to_string(),
            status: FileStatus::Modified,
            additions: 2,
            deletions: 1,
            patch,
        }
    }

    #[test]
    fn test_limits_file_count_with_note() {
        let diff = CommitDiff {
            files: (0..10)
                .map(|i| file(&format!("src/f{i}.rs"), Some("+a\n-b".to_string())))
                .collect(),
        };
        let options = DiffFormatOptions {
            max_files: 3,
            ..Default::default()
        };

        let rendered = format_diff(&diff, &options);
        assert_eq!(rendered.matches("File: ").count(), 3);
        assert!(rendered.contains("src/f2.rs"));
        assert!(!rendered.contains("src/f3.rs"));
        assert!(rendered.contains("7 more files"));
    }

    #[test]
    fn test_truncates_long_patch() {
        let patch = (0..50).map(|i| format!("+line {i}")).collect::<Vec<_>>().join("\n");
        let diff = CommitDiff {
            files: vec![file("big.rs", Some(patch))],
        };

        let rendered = format_diff(&diff, &DiffFormatOptions::default());
        assert!(rendered.contains("+line 29"));
        assert!(!rendered.contains("+line 30"));
        assert!(rendered.contains(TRUNCATION_MARKER));
        assert!(!rendered.contains("more file"));
    }

    #[test]
    fn test_short_patch_not_marked() {
        let diff = CommitDiff {
            files: vec![file("small.rs", Some("@@ -1 +1 @@\n-a\n+b".to_string()))],
        };

        let rendered = format_diff(&diff, &DiffFormatOptions::default());
        assert!(rendered.contains("File: small.rs (modified, +2/-1)"));
        assert!(rendered.contains("```diff\n@@ -1 +1 @@\n-a\n+b\n```"));
        assert!(!rendered.contains("truncated"));
    }

    #[test]
    fn test_missing_patch_renders_header_only() {
        let diff = CommitDiff {
            files: vec![file("logo.png", None)],
        };

        let rendered = format_diff(&diff, &DiffFormatOptions::default());
        assert_eq!(rendered, "File: logo.png (modified, +2/-1)\n");
    }

    #[test]
    fn test_empty_diff_renders_nothing() {
        assert!(format_diff(&CommitDiff::default(), &DiffFormatOptions::default()).is_empty());
    }
}
