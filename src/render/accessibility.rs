// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

// Accessibility policy: markdown-ish report text to decorated markup.
//
// Runs over the entire accumulated buffer on every delta. Each
// substitution is idempotent (the matched text no longer exists once
// replaced), so the repeated pass converts each heading exactly once —
// on the pass where its text has fully arrived.

use super::replace_first;
use regex::Regex;
use std::sync::OnceLock;

/// `[label](url)` pairs, non-greedy, converted to anchors.
fn markdown_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(.*?)\]\((.*?)\)").expect("static regex"))
}

/// Heading substitutions applied in order, first occurrence only.
const HEADINGS: &[(&str, &str)] = &[
    ("- Issues", "<h3>Issues</h3>"),
    ("- Conformance Level A -", "<h4>Conformance Level A</h4>"),
    ("- Conformance Level AA -", "<h4>Conformance Level AA</h4>"),
    ("- Conformance Level AAA -", "<h4>Conformance Level AAA</h4>"),
    ("- Accessibility Tests", "<br />\n<h3>Suggested Tests</h3>"),
    ("- Suggested Tests", "<br />\n<h3>Suggested Tests</h3>"),
];

/// Decorate the accumulated accessibility buffer.
pub fn decorate(text: &str) -> String {
    let mut out = markdown_link_re()
        .replace_all(
            text,
            r#"<a href="$2" target="_blank" rel="noopener noreferrer">$1</a>"#,
        )
        .into_owned();

    for (from, to) in HEADINGS {
        out = replace_first(&out, from, to);
    }

    out
}
