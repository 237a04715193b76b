// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

// Event classification: one text line to at most one delta event.
//
// The wire format is an SSE-like stream of `data: <json>` lines where
// `<json>` matches `{choices:[{delta:{content},finish_reason}]}`,
// terminated by a line containing `[DONE]`.

use serde_json::Value;

/// Stream terminator sentinel.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Length of the `data: ` prefix stripped from payload lines.
pub const DATA_PREFIX_LEN: usize = 6;

/// A unit of parsed content extracted from the wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaEvent {
    /// An incremental fragment of generated text.
    Content(String),
    /// The payload carried a non-null `finish_reason`.
    Finish,
    /// The `[DONE]` sentinel was seen.
    Done,
}

/// Decides, per text line, whether it carries a consumable payload.
///
/// Classification is stateless and lossy by design: a `data:` line whose
/// JSON is incomplete (split across a chunk boundary) yields no event and
/// is only logged. Redundant delivery of the same line yields the same
/// event again — deduplication of content is not attempted; only the
/// session's lifecycle handling is idempotent.
#[derive(Debug, Default)]
pub struct EventClassifier;

impl EventClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify one line. Lines that are neither the sentinel nor a
    /// parseable `data:` payload with content produce `None`.
    pub fn classify(&self, line: &str) -> Option<DeltaEvent> {
        if line.contains(DONE_SENTINEL) {
            return Some(DeltaEvent::Done);
        }

        if !line.starts_with("data") {
            return None;
        }

        // Fixed-width prefix strip; lines shorter than the prefix yield an
        // empty candidate, which fails the parse below and is dropped.
        let candidate = line.get(DATA_PREFIX_LEN..).unwrap_or("");

        let json: Value = match serde_json::from_str(candidate) {
            Ok(v) => v,
            Err(_) => {
                tracing::debug!(fragment = candidate, "skipping incomplete json fragment");
                return None;
            }
        };

        let choice = json.get("choices").and_then(|c| c.get(0))?;

        if choice
            .get("finish_reason")
            .is_some_and(|f| !f.is_null())
        {
            return Some(DeltaEvent::Finish);
        }

        choice
            .get("delta")
            .and_then(|d| d.get("content"))
            .and_then(Value::as_str)
            .map(|content| DeltaEvent::Content(content.to_string()))
    }
}
