// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line framing over arbitrarily-chunked byte streams.
//!
//! `go test -json` writes one JSON object per line, but the chunks handed to
//! us by the child's stdout pipe split lines (and even `\r\n` terminators) at
//! arbitrary byte boundaries. [`LineBuffer`] reassembles complete lines in
//! arrival order and holds the trailing partial line until the next chunk --
//! or until [`LineBuffer::finish`], since the last line of a crashed run often
//! has no terminator at all.

use bytes::{Buf, BytesMut};

/// The size at which we grow the reassembly buffer.
///
/// This size is not totally arbitrary, but rather the (normal) page size on
/// most linux, windows, and macos systems.
const CHUNK_SIZE: usize = 4 * 1024;

/// Reassembles complete text lines from a stream of byte chunks.
///
/// Both `\n` and `\r\n` are accepted as terminators; the terminator is not
/// part of the emitted line. Lines are decoded lossily, since `go test`
/// output is UTF-8 in practice but test binaries can write anything.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: BytesMut,
}

impl LineBuffer {
    /// Creates an empty line buffer.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(CHUNK_SIZE),
        }
    }

    /// Appends a chunk, invoking `on_line` once per completed line.
    ///
    /// Lines are delivered in order, and each exactly once: a line split
    /// across chunks is emitted by the push that supplies its terminator.
    pub fn push(&mut self, chunk: &[u8], mut on_line: impl FnMut(&str)) {
        if chunk.is_empty() {
            return;
        }

        if self.buf.capacity() - self.buf.len() < chunk.len() {
            self.buf.reserve(CHUNK_SIZE.max(chunk.len()));
        }
        self.buf.extend_from_slice(chunk);

        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            {
                let line = &self.buf[..pos];
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                on_line(&String::from_utf8_lossy(line));
            }
            self.buf.advance(pos + 1);
        }
    }

    /// Flushes the residual partial line, if any.
    ///
    /// Called at stream end: a final line without a trailing terminator must
    /// still reach the decoder.
    pub fn finish(mut self, mut on_line: impl FnMut(&str)) {
        if !self.buf.is_empty() {
            let line = self.buf.split();
            on_line(&String::from_utf8_lossy(&line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn frame_chunked(input: &[u8], chunk_size: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut buffer = LineBuffer::new();
        for chunk in input.chunks(chunk_size.max(1)) {
            buffer.push(chunk, |line| lines.push(line.to_owned()));
        }
        buffer.finish(|line| lines.push(line.to_owned()));
        lines
    }

    #[test]
    fn emits_lines_in_order() {
        let lines = frame_chunked(b"alpha\nbeta\ngamma\n", 1024);
        assert_eq!(lines, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn crlf_terminators_are_stripped() {
        let lines = frame_chunked(b"alpha\r\nbeta\nga\r\n", 1024);
        assert_eq!(lines, vec!["alpha", "beta", "ga"]);
    }

    #[test]
    fn residual_line_is_flushed() {
        let lines = frame_chunked(b"alpha\nno terminator", 1024);
        assert_eq!(lines, vec!["alpha", "no terminator"]);
    }

    #[test]
    fn empty_chunks_are_ignored() {
        let mut lines = Vec::new();
        let mut buffer = LineBuffer::new();
        buffer.push(b"", |line| lines.push(line.to_owned()));
        buffer.push(b"alpha\n", |line| lines.push(line.to_owned()));
        buffer.push(b"", |line| lines.push(line.to_owned()));
        buffer.finish(|line| lines.push(line.to_owned()));
        assert_eq!(lines, vec!["alpha"]);
    }

    #[test]
    fn empty_lines_are_preserved() {
        let lines = frame_chunked(b"\n\nalpha\n\n", 1024);
        assert_eq!(lines, vec!["", "", "alpha", ""]);
    }

    // Chunk size 1 splits every terminator; 2 and 3 split `\r\n` pairs at
    // various offsets; larger sizes split mid-line.
    #[test_case(1; "byte at a time")]
    #[test_case(2; "two bytes")]
    #[test_case(3; "three bytes")]
    #[test_case(7; "mid line")]
    #[test_case(4096; "single chunk")]
    fn framing_is_chunking_independent(chunk_size: usize) {
        let input: &[u8] = b"{\"Action\":\"run\"}\r\nplain text line\n\nlast line no newline";
        let expected = frame_chunked(input, input.len());
        assert_eq!(frame_chunked(input, chunk_size), expected);
    }
}
