// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

// Stream session: drives one in-flight streaming request.
//
// Consumes the response byte stream chunk by chunk, splits chunks into
// lines, classifies each line, and dispatches content deltas to the
// feature's render policy. Owns the lifecycle state machine:
//
//   Idle -> Streaming -> { Finished | Error }
//
// Finished and Error are terminal. The wire can signal completion twice
// (a non-null finish_reason followed by the [DONE] sentinel); the first
// transition wins and exactly one lifecycle message goes out. No retries
// at this layer — a failed stream requires a fresh user action.

use crate::client::TransportError;
use crate::feature::Feature;
use crate::notify::{ErrorKey, LifecycleMessage, Notifier};
use crate::render::{DeltaRenderer, RenderTarget};
use crate::stream::classifier::{DeltaEvent, EventClassifier};
use crate::stream::reassembler::chunk_lines;
use bytes::Bytes;
use tokio::sync::oneshot;
use tokio_stream::{Stream, StreamExt};
use uuid::Uuid;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Streaming,
    Finished,
    Error,
}

/// How the session ended, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Stream completed; one finished notification was sent.
    Finished,
    /// Stream failed; one error notification was sent.
    Failed(ErrorKey),
    /// Cancelled by a newer request. Benign: no notification at all.
    Aborted,
}

/// One in-flight streaming request.
pub struct StreamSession<'a> {
    feature: Feature,
    request_id: Uuid,
    state: SessionState,
    classifier: EventClassifier,
    renderer: DeltaRenderer<'a>,
    notifier: &'a dyn Notifier,
}

impl<'a> StreamSession<'a> {
    pub fn new(
        feature: Feature,
        language: impl Into<String>,
        target: &'a dyn RenderTarget,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            feature,
            request_id: Uuid::new_v4(),
            state: SessionState::Idle,
            classifier: EventClassifier::new(),
            renderer: DeltaRenderer::new(feature, language, target),
            notifier,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Consume the response stream to completion.
    ///
    /// `abort` fires when a newer request supersedes this one; the
    /// session stops reading and reports `Aborted` without notifying.
    pub async fn run(
        mut self,
        mut input: impl Stream<Item = Result<Bytes, TransportError>> + Unpin,
        mut abort: Option<oneshot::Receiver<()>>,
    ) -> SessionOutcome {
        self.state = SessionState::Streaming;
        tracing::debug!(request_id = %self.request_id, feature = %self.feature, "stream started");

        loop {
            let next = match abort.as_mut() {
                Some(rx) => {
                    tokio::select! {
                        _ = rx => {
                            tracing::info!(request_id = %self.request_id, "stream aborted by newer request");
                            return SessionOutcome::Aborted;
                        }
                        item = input.next() => item,
                    }
                }
                None => input.next().await,
            };

            match next {
                Some(Ok(chunk)) => {
                    for line in chunk_lines(&chunk) {
                        self.handle_line(&line);
                    }
                }
                Some(Err(err)) => {
                    tracing::warn!(request_id = %self.request_id, error = %err, "stream read failed");
                    // A read failure after the wire already signalled
                    // completion changes nothing for the caller.
                    if self.state == SessionState::Finished {
                        return SessionOutcome::Finished;
                    }
                    self.fail(ErrorKey::Failed);
                    return SessionOutcome::Failed(ErrorKey::Failed);
                }
                // End of input with nothing left to reassemble: terminal
                // DONE, whether or not the wire sentinel was seen.
                None => {
                    self.finish();
                    return SessionOutcome::Finished;
                }
            }
        }
    }

    fn handle_line(&mut self, line: &str) {
        match self.classifier.classify(line) {
            Some(DeltaEvent::Content(text)) => self.renderer.apply(&text),
            Some(DeltaEvent::Finish) | Some(DeltaEvent::Done) => self.finish(),
            None => {}
        }
    }

    /// Transition to Finished and notify, once. Duplicate completion
    /// signals (finish_reason + [DONE] + end of input) are no-ops.
    fn finish(&mut self) {
        if matches!(self.state, SessionState::Finished | SessionState::Error) {
            return;
        }
        self.state = SessionState::Finished;
        tracing::info!(request_id = %self.request_id, feature = %self.feature, "stream finished");
        self.notifier.notify(LifecycleMessage::finished());
    }

    fn fail(&mut self, key: ErrorKey) {
        if matches!(self.state, SessionState::Finished | SessionState::Error) {
            return;
        }
        self.state = SessionState::Error;
        self.notifier.notify(LifecycleMessage::error(key));
    }
}
