// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

// Chunk reassembly: raw response chunks to text lines.
//
// Each chunk is decoded as UTF-8 on its own and split on `\n`. There is
// no byte-level buffering across chunk boundaries: a multi-byte character
// split across chunks decodes lossily, and a partial line at the end of a
// chunk is handed out as if it were complete. Both are accepted
// limitations of the wire contract, compensated for downstream — a
// `data:` line cut mid-JSON fails to parse and is dropped, and the
// backend flushes on line boundaries in practice.

/// Split one raw chunk into text lines.
///
/// Every piece between newlines is a line, including the trailing piece
/// after the last newline (usually empty, sometimes a partial line).
pub fn chunk_lines(chunk: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(chunk)
        .split('\n')
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_newlines() {
        let lines = chunk_lines(b"data: a\ndata: b\n");
        assert_eq!(lines, vec!["data: a", "data: b", ""]);
    }

    #[test]
    fn trailing_partial_line_is_kept() {
        let lines = chunk_lines(b"data: complete\ndata: {\"trunc");
        assert_eq!(lines, vec!["data: complete", "data: {\"trunc"]);
    }

    #[test]
    fn chunk_without_newline_is_one_line() {
        assert_eq!(chunk_lines(b"[DONE]"), vec!["[DONE]"]);
    }

    #[test]
    fn invalid_utf8_decodes_lossily() {
        let lines = chunk_lines(&[b'a', 0xff, b'\n', b'b']);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('a'));
        assert_eq!(lines[1], "b");
    }
}
