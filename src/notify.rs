// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

// Lifecycle notification bus.
//
// One-directional, fire-and-forget messaging between the streaming core
// and whichever surface initiated the request. Delivery is best effort:
// the listener may already be gone (the popup that started a generation
// can close before the stream ends), so send failures are logged and
// swallowed, never propagated.

use serde::Serialize;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Message types
// ---------------------------------------------------------------------------

/// Message key carried on error notifications, derived from the HTTP
/// status observed when the request was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKey {
    /// 401 from the backend — the configured OpenAI key was rejected.
    InvalidApiKey,
    /// 413 from the backend — the selected element source is too large.
    PayloadTooLarge,
    /// Any other failure: non-2xx status, transport error, read failure.
    Failed,
}

/// Terminal status of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Finished,
    Error,
}

/// Cross-context notification sent once a stream ends or fails.
///
/// Wire shape mirrors `{source: "stream", status, message?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleMessage {
    pub source: &'static str,
    pub status: StreamStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<ErrorKey>,
}

impl LifecycleMessage {
    pub fn finished() -> Self {
        Self {
            source: "stream",
            status: StreamStatus::Finished,
            message: None,
        }
    }

    pub fn error(key: ErrorKey) -> Self {
        Self {
            source: "stream",
            status: StreamStatus::Error,
            message: Some(key),
        }
    }
}

// ---------------------------------------------------------------------------
// Trait: Notifier
// ---------------------------------------------------------------------------

/// Sends lifecycle messages to the owning context.
///
/// Implementations must not assume a receiver is listening and must not
/// block the stream loop on delivery.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: LifecycleMessage);
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

/// Notifier backed by an unbounded tokio channel.
///
/// `subscribe` hands out the receiving half; dropping it is fine — later
/// sends are logged at debug and discarded.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<LifecycleMessage>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LifecycleMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: LifecycleMessage) {
        if self.tx.send(message.clone()).is_err() {
            tracing::debug!(?message, "lifecycle receiver gone, message dropped");
        }
    }
}

/// Notifier for callers that do not listen for lifecycle messages.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _message: LifecycleMessage) {}
}
