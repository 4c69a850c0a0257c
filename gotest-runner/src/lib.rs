// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for [gotest-action](https://crates.io/crates/gotest-action).
//!
//! This crate wraps a `go test -json` subprocess and turns its
//! newline-delimited event stream into a per-test result ledger, panic and
//! sanitizer-error classification, and source-location annotations extracted
//! from free-text failure output. The binary crate layers a CLI and a GitHub
//! Actions output surface on top.

pub mod aggregator;
pub mod annotate;
pub mod classify;
pub mod errors;
pub mod events;
pub mod line_buffer;
pub mod reporter;
pub mod resolver;
pub mod run;
pub mod settings;
mod time;
