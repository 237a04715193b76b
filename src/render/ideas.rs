// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

// Test-ideas policy: each idea line becomes a selectable item.

use super::{replace_first, LINE_BREAK};

/// Interactive checkbox markup inserted before each idea line.
pub const CHECKBOX_MARKER: &str = r#"<input type="checkbox" name="idea">"#;

/// Transform one test-ideas delta.
///
/// Newlines become line-break markup and the first dash is dropped.
/// Unless the fragment is a section heading (`Tests:` / `Scenarios:`) or
/// a run of blank lines, a checkbox marker is inserted after the first
/// line break so the next idea starts as a selectable item.
pub fn transform_idea_fragment(fragment: &str) -> String {
    let mut content = fragment.replace('\n', LINE_BREAK);
    content = replace_first(&content, "-", "");

    let is_heading = content.contains("Tests:") || content.contains("Scenarios:");
    let is_blank_run = content.contains("<br />\n<br />\n");
    if !is_heading && !is_blank_run {
        let with_checkbox = format!("{LINE_BREAK}{CHECKBOX_MARKER} ");
        content = replace_first(&content, LINE_BREAK, &with_checkbox);
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idea_line_gets_checkbox_after_break() {
        let out = transform_idea_fragment("- check empty input\n");
        assert_eq!(
            out,
            format!(" check empty input{LINE_BREAK}{CHECKBOX_MARKER} ")
        );
    }

    #[test]
    fn heading_line_excluded_from_checkbox() {
        let out = transform_idea_fragment("- Tests:\n");
        assert_eq!(out, format!(" Tests:{LINE_BREAK}"));
        assert!(!out.contains(CHECKBOX_MARKER));
    }

    #[test]
    fn scenarios_heading_excluded() {
        let out = transform_idea_fragment("- Scenarios:\n");
        assert!(!out.contains(CHECKBOX_MARKER));
    }

    #[test]
    fn consecutive_blank_lines_excluded() {
        let out = transform_idea_fragment("\n\n");
        assert_eq!(out, format!("{LINE_BREAK}{LINE_BREAK}"));
        assert!(!out.contains(CHECKBOX_MARKER));
    }

    #[test]
    fn only_first_dash_removed() {
        let out = transform_idea_fragment("- multi-word idea\n");
        assert!(out.starts_with(" multi-word idea"));
    }

    #[test]
    fn fragment_without_newline_passes_through() {
        let out = transform_idea_fragment("partial idea text");
        assert_eq!(out, "partial idea text");
    }
}
