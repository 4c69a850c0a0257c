// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning aggregated results into a verdict and user-facing messages.
//!
//! The reporter walks the aggregator's ledger once, after the subprocess has
//! exited. It decides the overall verdict, emits one titled block per
//! classified test, resolves source annotations for failing tests, and closes
//! with a summary line. Everything goes through a [`ReportSink`]; this module
//! never touches ANSI codes or decides how a host displays anything.

mod imp;
mod sink;

pub use imp::*;
pub use sink::*;
