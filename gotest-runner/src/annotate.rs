// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extraction of source-location annotations from failure output.
//!
//! Go test diagnostics look like
//!
//! ```text
//!     utils_test.go:42: expected 1 got 2
//!         some continuation context
//! ```
//!
//! i.e. a header line carrying a bare `file.go:line` reference followed by
//! indented continuation lines. The extractor groups a header and its
//! continuations into one [`Annotation`] keyed by the header's file and line,
//! so a CI host can pin the whole block to one source location.

use crate::classify::is_panic_line;
use regex::Regex;
use std::sync::LazyLock;

/// Matches a diagnostic header at the start of a trimmed line: a bare
/// filename (no path separators) followed by a line number. Anchoring keeps
/// stack-trace frames like `/home/x/pkg/file.go:3` from opening annotations.
static FILE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+\.go):(\d+)").expect("file:line regex is valid"));

/// A source-location finding derived from one failing test's output.
///
/// Transient: built at report time from a test record's output and discarded
/// after being surfaced. Not part of aggregator state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Annotation {
    /// Bare source filename, e.g. `utils_test.go`.
    pub file: String,
    /// 1-based line number.
    pub line: u64,
    /// The grouped diagnostic text: the header line plus its continuations,
    /// trimmed at both ends.
    pub text: String,
}

/// Segments a failing test's output lines into annotations.
///
/// Test-runner noise (`=== RUN`, `--- FAIL`) is skipped; everything from the
/// first `panic:` line onward is ignored, since panic payloads are surfaced
/// through the classifier path instead; lines before the first `file.go:line`
/// header are dropped.
pub fn extract_annotations<S: AsRef<str>>(output: &[S]) -> Vec<Annotation> {
    let mut annotations = Vec::new();
    let mut open: Option<Annotation> = None;

    for fragment in output {
        // Output fragments arrive with their own line terminators.
        let line = fragment
            .as_ref()
            .trim_end_matches('\n')
            .trim_end_matches('\r');
        let trimmed = line.trim();

        if trimmed.starts_with("=== RUN") || trimmed.starts_with("--- FAIL") {
            continue;
        }
        if is_panic_line(trimmed) {
            break;
        }

        if let Some(captures) = FILE_LINE_RE.captures(trimmed) {
            // Line numbers that don't fit in u64 can't come from real output.
            let Ok(line_number) = captures[2].parse::<u64>() else {
                continue;
            };
            if let Some(finished) = open.take() {
                annotations.push(finished);
            }
            open = Some(Annotation {
                file: captures[1].to_owned(),
                line: line_number.max(1),
                text: line.to_owned(),
            });
        } else if let Some(annotation) = open.as_mut() {
            annotation.text.push_str(line);
        }
    }

    if let Some(finished) = open.take() {
        annotations.push(finished);
    }

    for annotation in &mut annotations {
        annotation.text = annotation.text.trim().to_owned();
    }
    annotations
}
