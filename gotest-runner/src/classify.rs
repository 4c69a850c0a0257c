// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic detection of panics and sanitizer errors in test output.
//!
//! These are substring heuristics over unstructured text, not a grammar. The
//! literals are load-bearing: downstream tooling keys off exactly these
//! matches, so they must not be "improved" (e.g. widened to all `panic:`
//! prefixes, which would also catch tests that merely print the word).

/// A runtime panic, as printed by the Go runtime at the start of a line.
const PANIC_PREFIX: &str = "panic: runtime error:";

/// A sanitizer report (`==ERROR: AddressSanitizer`, `==ERROR: LeakSanitizer`,
/// data race reports under `-race`, etc.), which can appear mid-line.
const ERROR_MARKER: &str = "==ERROR:";

/// The failure signature detected in a single output fragment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureSignature {
    /// The fragment begins a runtime panic report.
    Panic,
    /// The fragment contains a sanitizer error report.
    SanitizerError,
}

/// Classifies one output fragment as it arrives.
///
/// This is a pure predicate over the fragment text: it never consults prior
/// fragments, so a signature split across two output events at a non-line
/// boundary goes undetected. That is an accepted limitation of line-oriented
/// scanning, kept as-is.
pub fn classify_fragment(fragment: &str) -> Option<FailureSignature> {
    if fragment.starts_with(PANIC_PREFIX) {
        Some(FailureSignature::Panic)
    } else if fragment.contains(ERROR_MARKER) {
        Some(FailureSignature::SanitizerError)
    } else {
        None
    }
}

/// Returns true if this trimmed line starts a panic report of any kind.
///
/// Used by the annotation extractor to stop scanning: panic payloads are
/// surfaced through the classifier/reporter path, not as file annotations.
/// Note this is broader than [`FailureSignature::Panic`], which only matches
/// runtime panics.
pub fn is_panic_line(trimmed: &str) -> bool {
    trimmed.starts_with("panic:")
}
