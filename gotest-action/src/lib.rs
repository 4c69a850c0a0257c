// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CI front-end for [gotest-runner](gotest_runner): runs `go test -json`,
//! classifies the results, and surfaces them either as GitHub Actions
//! workflow commands or as plain colored console output.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
