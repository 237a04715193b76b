// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

// Code-generation policy: strip markdown code fences from a fragment.

/// Strip a language-keyed fence header and a trailing fence from one
/// fragment of generated code.
///
/// Removes a leading ```` ```<language> ```` (or bare ```` ``` ````)
/// plus the newline that follows it, and a closing fence at the end of
/// the fragment. Fence text embedded inside the code itself is left
/// alone. Fences split across deltas are not reassembled; each fragment
/// is trimmed independently.
pub fn clean_fragment(fragment: &str, language: &str) -> String {
    let mut data = fragment;

    let header = format!("```{language}");
    if let Some(rest) = data.strip_prefix(&header) {
        data = rest.strip_prefix('\n').unwrap_or(rest);
    } else if let Some(rest) = data.strip_prefix("```") {
        data = rest.strip_prefix('\n').unwrap_or(rest);
    }

    let mut out = data.to_string();
    if let Some(idx) = out.rfind("```") {
        // Only treat it as a closing fence when nothing but whitespace follows.
        if out[idx + 3..].trim().is_empty() {
            out.truncate(idx);
        }
    }

    out
}
