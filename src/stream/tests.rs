// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

// Session-level tests for the streaming protocol handler.
//
// Covers:
//  1. Complete valid stream ending in [DONE] -> exactly one FINISHED
//  2. Truncated data: JSON -> zero deltas, no failure
//  3. Duplicate completion (finish_reason then [DONE]) collapses
//  4. Content split across chunk boundaries -> incomplete line dropped
//  5. Transport error mid-stream -> exactly one ERROR
//  6. Abort -> no lifecycle message at all
//  7. Per-feature rendering through a full session

use super::*;
use crate::client::TransportError;
use crate::feature::Feature;
use crate::notify::{ErrorKey, LifecycleMessage, Notifier, StreamStatus};
use crate::render::{BufferTarget, RenderTarget, CHECKBOX_MARKER};
use bytes::Bytes;
use std::sync::Mutex;
use tokio::sync::oneshot;

// ---------------------------------------------------------------------------
// Test doubles and helpers
// ---------------------------------------------------------------------------

/// Notifier that records every lifecycle message it is handed.
#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<LifecycleMessage>>,
}

impl RecordingNotifier {
    fn new() -> Self {
        Self::default()
    }

    fn recorded(&self) -> Vec<LifecycleMessage> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: LifecycleMessage) {
        self.messages.lock().unwrap().push(message);
    }
}

/// Build an in-memory chunk stream; each string is one network chunk.
fn chunk_stream(
    chunks: Vec<&str>,
) -> impl tokio_stream::Stream<Item = Result<Bytes, TransportError>> + Unpin {
    let chunks: Vec<Result<Bytes, TransportError>> = chunks
        .into_iter()
        .map(|c| Ok(Bytes::from(c.to_string())))
        .collect();
    tokio_stream::iter(chunks)
}

fn content_chunk(text: &str) -> String {
    format!(
        "data: {{\"choices\":[{{\"delta\":{{\"content\":{}}},\"finish_reason\":null}}]}}\n",
        serde_json::to_string(text).unwrap()
    )
}

async fn run_session(
    feature: Feature,
    language: &str,
    chunks: Vec<&str>,
) -> (SessionOutcome, String, Vec<LifecycleMessage>) {
    let target = BufferTarget::new();
    let notifier = RecordingNotifier::new();
    let session = StreamSession::new(feature, language, &target, &notifier);
    let outcome = session.run(chunk_stream(chunks), None).await;
    (outcome, target.contents(), notifier.recorded())
}

// ---------------------------------------------------------------------------
// Test 1: complete stream -> exactly one FINISHED
// ---------------------------------------------------------------------------

#[tokio::test]
async fn complete_stream_produces_exactly_one_finished() {
    let c1 = content_chunk("Hello");
    let (outcome, rendered, messages) = run_session(
        Feature::CheckAccessibility,
        "",
        vec![&c1, "data: [DONE]\n"],
    )
    .await;

    assert_eq!(outcome, SessionOutcome::Finished);
    assert_eq!(rendered, "Hello");
    assert_eq!(messages, vec![LifecycleMessage::finished()]);
}

// ---------------------------------------------------------------------------
// Test 2: truncated JSON dropped without output or failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn truncated_json_line_produces_no_output_and_no_error() {
    let (outcome, rendered, messages) = run_session(
        Feature::CheckAccessibility,
        "",
        vec![
            "data: {\"choices\":[{\"delta\":{\"cont",
            "data: [DONE]\n",
        ],
    )
    .await;

    assert_eq!(outcome, SessionOutcome::Finished);
    assert_eq!(rendered, "");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].status, StreamStatus::Finished);
}

// ---------------------------------------------------------------------------
// Test 3: spec end-to-end scenario — duplicate completion collapses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn finish_reason_then_done_sentinel_notifies_once() {
    // Classifier-level: both completion events exist on the wire.
    let classifier = EventClassifier::new();
    assert_eq!(
        classifier
            .classify(r#"data: {"choices":[{"delta":{"content":null},"finish_reason":"stop"}]}"#),
        Some(DeltaEvent::Finish)
    );
    assert_eq!(classifier.classify("[DONE]"), Some(DeltaEvent::Done));

    // Session-level: the state machine collapses them to one message.
    let c1 = content_chunk("Hello");
    let (outcome, rendered, messages) = run_session(
        Feature::CheckAccessibility,
        "",
        vec![
            &c1,
            "data: {\"choices\":[{\"delta\":{\"content\":null},\"finish_reason\":\"stop\"}]}\n[DONE]\n",
        ],
    )
    .await;

    assert_eq!(outcome, SessionOutcome::Finished);
    assert_eq!(rendered, "Hello");
    assert_eq!(messages, vec![LifecycleMessage::finished()]);
}

// ---------------------------------------------------------------------------
// Test 4: a data: line split across chunks is lost, later lines survive
// ---------------------------------------------------------------------------

#[tokio::test]
async fn line_split_across_chunks_is_dropped_not_merged() {
    let tail = content_chunk("kept");
    let (outcome, rendered, _messages) = run_session(
        Feature::CheckAccessibility,
        "",
        vec![
            // One JSON line cut mid-object at the chunk boundary. Both
            // halves fail to parse on their own; no merging happens.
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo",
            "st\"},\"finish_reason\":null}]}\n",
            &tail,
            "data: [DONE]\n",
        ],
    )
    .await;

    assert_eq!(outcome, SessionOutcome::Finished);
    assert_eq!(rendered, "kept");
}

// ---------------------------------------------------------------------------
// Test 5: transport error -> exactly one ERROR message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transport_error_notifies_error_once() {
    let chunks: Vec<Result<Bytes, TransportError>> = vec![
        Ok(Bytes::from(content_chunk("partial"))),
        Err(TransportError("connection reset".into())),
    ];
    let target = BufferTarget::new();
    let notifier = RecordingNotifier::new();
    let session = StreamSession::new(Feature::CheckAccessibility, "", &target, &notifier);

    let outcome = session.run(tokio_stream::iter(chunks), None).await;

    assert_eq!(outcome, SessionOutcome::Failed(ErrorKey::Failed));
    assert_eq!(
        notifier.recorded(),
        vec![LifecycleMessage::error(ErrorKey::Failed)]
    );
    // Content before the failure was still rendered.
    assert_eq!(target.contents(), "partial");
}

// ---------------------------------------------------------------------------
// Test 6: error after completion is absorbed by the terminal state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn error_after_done_sentinel_is_ignored() {
    let chunks: Vec<Result<Bytes, TransportError>> = vec![
        Ok(Bytes::from_static(b"data: [DONE]\n")),
        Err(TransportError("late failure".into())),
    ];
    let target = BufferTarget::new();
    let notifier = RecordingNotifier::new();
    let session = StreamSession::new(Feature::CheckAccessibility, "", &target, &notifier);

    let outcome = session.run(tokio_stream::iter(chunks), None).await;

    // The read failure ends the loop, but the completed state wins and
    // no second message goes out.
    assert_eq!(outcome, SessionOutcome::Finished);
    assert_eq!(notifier.recorded(), vec![LifecycleMessage::finished()]);
}

// ---------------------------------------------------------------------------
// Test 7: abort is benign
// ---------------------------------------------------------------------------

#[tokio::test]
async fn aborted_session_sends_no_lifecycle_message() {
    let (chunk_tx, chunk_rx) =
        tokio::sync::mpsc::channel::<Result<Bytes, TransportError>>(4);
    let (abort_tx, abort_rx) = oneshot::channel();

    let target = BufferTarget::new();
    let notifier = RecordingNotifier::new();
    let session = StreamSession::new(Feature::TestIdeas, "", &target, &notifier);

    chunk_tx
        .send(Ok(Bytes::from(content_chunk("- first idea\n"))))
        .await
        .unwrap();
    abort_tx.send(()).unwrap();

    let outcome = session
        .run(
            tokio_stream::wrappers::ReceiverStream::new(chunk_rx),
            Some(abort_rx),
        )
        .await;

    assert_eq!(outcome, SessionOutcome::Aborted);
    assert!(notifier.recorded().is_empty());
}

// ---------------------------------------------------------------------------
// Test 8: stream ending without any completion signal still finishes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn end_of_input_without_sentinel_finishes() {
    let c1 = content_chunk("tail content");
    let (outcome, rendered, messages) =
        run_session(Feature::CheckAccessibility, "", vec![&c1]).await;

    assert_eq!(outcome, SessionOutcome::Finished);
    assert_eq!(rendered, "tail content");
    assert_eq!(messages, vec![LifecycleMessage::finished()]);
}

// ---------------------------------------------------------------------------
// Per-feature rendering through full sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_ideas_heading_gets_no_checkbox() {
    let heading = content_chunk("- Tests:\n");
    let idea = content_chunk("- validate required fields\n");
    let (_outcome, rendered, _messages) = run_session(
        Feature::TestIdeas,
        "",
        vec![&heading, &idea, "data: [DONE]\n"],
    )
    .await;

    assert!(rendered.starts_with(" Tests:<br />\n"));
    // The heading line itself carries no checkbox; the idea line does.
    let first_line = rendered.split("<br />\n").next().unwrap();
    assert!(!first_line.contains(CHECKBOX_MARKER));
    assert!(rendered.contains(CHECKBOX_MARKER));
}

#[tokio::test]
async fn code_generation_strips_python_fences() {
    let block = content_chunk("```python\nprint(1)\n```");
    let (_outcome, rendered, _messages) = run_session(
        Feature::AutomateTests,
        "python",
        vec![&block, "data: [DONE]\n"],
    )
    .await;

    assert_eq!(rendered, "print(1)\n");
}

#[tokio::test]
async fn accessibility_report_is_decorated_across_deltas() {
    let head = content_chunk("- Issues\n");
    let body = content_chunk("Low contrast, see [WCAG](https://w3.org/WAI)\n");
    let (_outcome, rendered, _messages) = run_session(
        Feature::CheckAccessibility,
        "",
        vec![&head, &body, "data: [DONE]\n"],
    )
    .await;

    assert!(rendered.contains("<h3>Issues</h3>"));
    assert!(rendered.contains(r#"<a href="https://w3.org/WAI" target="_blank" rel="noopener noreferrer">WCAG</a>"#));
    assert!(!rendered.contains("[WCAG]"));
}
