// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

// Delta dispatch: route extracted content to the feature's transform.
//
// Each feature has a text transformation policy; the actual display of
// the transformed text is the caller's concern. Render targets are
// injected, never looked up globally.

mod accessibility;
mod code;
mod ideas;

pub use accessibility::decorate as decorate_accessibility;
pub use code::clean_fragment as clean_code_fragment;
pub use ideas::{transform_idea_fragment, CHECKBOX_MARKER};

use crate::feature::Feature;
use std::sync::Mutex;

/// Line-break markup substituted for `\n` in prose output.
pub const LINE_BREAK: &str = "<br />\n";

// ---------------------------------------------------------------------------
// Trait: RenderTarget
// ---------------------------------------------------------------------------

/// Where transformed text accumulates.
///
/// `append` adds to the end; `replace` swaps the whole accumulated
/// content (used by policies that re-process their buffer).
pub trait RenderTarget: Send + Sync {
    fn append(&self, text: &str);
    fn replace(&self, text: &str);
    fn contents(&self) -> String;
}

/// In-memory render target.
#[derive(Debug, Default)]
pub struct BufferTarget {
    inner: Mutex<String>,
}

impl BufferTarget {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderTarget for BufferTarget {
    fn append(&self, text: &str) {
        self.inner.lock().expect("buffer poisoned").push_str(text);
    }

    fn replace(&self, text: &str) {
        *self.inner.lock().expect("buffer poisoned") = text.to_string();
    }

    fn contents(&self) -> String {
        self.inner.lock().expect("buffer poisoned").clone()
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Applies the feature's transform policy to each content delta.
pub struct DeltaRenderer<'a> {
    feature: Feature,
    language: String,
    target: &'a dyn RenderTarget,
}

impl<'a> DeltaRenderer<'a> {
    pub fn new(feature: Feature, language: impl Into<String>, target: &'a dyn RenderTarget) -> Self {
        Self {
            feature,
            language: language.into(),
            target,
        }
    }

    /// Transform one content delta and apply it to the render target.
    pub fn apply(&self, content: &str) {
        match self.feature {
            Feature::TestIdeas => {
                self.target.append(&ideas::transform_idea_fragment(content));
            }
            Feature::CheckAccessibility => {
                // Append the converted fragment, then re-decorate the whole
                // buffer. The substitutions are idempotent, so headings and
                // links that arrive split across deltas convert exactly once,
                // on the pass where they complete.
                self.target.append(&content.replace('\n', LINE_BREAK));
                let decorated = accessibility::decorate(&self.target.contents());
                self.target.replace(&decorated);
            }
            Feature::AutomateTests | Feature::AutomateFromIdeas => {
                self.target
                    .append(&code::clean_fragment(content, &self.language));
            }
        }
    }
}

/// Replace the first occurrence of `from` in `s`, like JavaScript's
/// single-string `String.replace`.
pub(crate) fn replace_first(s: &str, from: &str, to: &str) -> String {
    match s.find(from) {
        Some(idx) => {
            let mut out = String::with_capacity(s.len() + to.len());
            out.push_str(&s[..idx]);
            out.push_str(to);
            out.push_str(&s[idx + from.len()..]);
            out
        }
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_first_only_touches_first_occurrence() {
        assert_eq!(replace_first("a-b-c", "-", ""), "ab-c");
        assert_eq!(replace_first("abc", "x", "y"), "abc");
    }

    #[test]
    fn buffer_target_append_and_replace() {
        let target = BufferTarget::new();
        target.append("one");
        target.append(" two");
        assert_eq!(target.contents(), "one two");
        target.replace("fresh");
        assert_eq!(target.contents(), "fresh");
    }

    #[test]
    fn code_features_dispatch_to_fence_stripping() {
        let target = BufferTarget::new();
        let renderer = DeltaRenderer::new(Feature::AutomateTests, "python", &target);
        renderer.apply("```python\nprint(1)\n```");
        assert_eq!(target.contents(), "print(1)\n");
    }

    #[test]
    fn ideas_dispatch_accumulates_markup() {
        let target = BufferTarget::new();
        let renderer = DeltaRenderer::new(Feature::TestIdeas, "", &target);
        renderer.apply("- Tests:\n");
        renderer.apply("- verify the button label\n");
        let out = target.contents();
        assert!(out.starts_with(" Tests:<br />\n"));
        assert!(out.contains(CHECKBOX_MARKER));
    }
}
