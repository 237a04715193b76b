// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

// Streaming response protocol handler.
//
// Responsibilities:
// - Split raw response chunks into newline-delimited text lines
// - Classify each line: [DONE] sentinel, data: payload, or noise
// - Extract content deltas from parsed payloads
// - Drive the per-request session state machine and dispatch deltas
//   to the feature's render policy
// - Emit exactly one lifecycle notification when the stream ends

mod classifier;
mod reassembler;
mod session;

pub use classifier::{DeltaEvent, EventClassifier, DATA_PREFIX_LEN, DONE_SENTINEL};
pub use reassembler::chunk_lines;
pub use session::{SessionOutcome, SessionState, StreamSession};

#[cfg(test)]
mod tests;
