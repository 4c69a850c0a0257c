// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by gotest-runner.

use std::process::ExitStatus;
use thiserror::Error;

/// A line of the event stream failed to decode as a test event.
///
/// This is a per-line diagnostic, not a fatal error: the pipeline logs it and
/// keeps consuming the stream.
#[derive(Debug, Error)]
#[error("failed to decode test event line `{line}`")]
pub struct EventDecodeError {
    /// The offending line, verbatim.
    pub line: String,
    /// The underlying JSON error.
    #[source]
    pub error: serde_json::Error,
}

/// An error that occurred while running the `go test` subprocess.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunTestsError {
    /// The subprocess could not be spawned.
    #[error("failed to spawn `{command}`")]
    Spawn {
        /// The command that failed to start.
        command: String,
        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// A child stream was not captured; indicates a bug in process setup.
    #[error("child process did not expose {stream}")]
    StreamMissing {
        /// Which stream was missing.
        stream: &'static str,
    },

    /// Reading from the child's stdout failed.
    #[error("error reading standard output")]
    ReadStdout(#[source] std::io::Error),

    /// Reading from the child's stderr failed.
    #[error("error reading standard error")]
    ReadStderr(#[source] std::io::Error),

    /// Waiting for the child to exit failed.
    #[error("error waiting for `{command}` to exit")]
    Wait {
        /// The command being waited on.
        command: String,
        /// The underlying error.
        #[source]
        error: std::io::Error,
    },
}

/// An error resolving a package import path to a source directory.
///
/// Resolution failures are isolated per call: one failed lookup drops that
/// annotation and the report continues.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PackageResolveError {
    /// `go list` could not be executed.
    #[error("failed to run `go list` for package `{package}`")]
    Exec {
        /// The package being resolved.
        package: String,
        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// `go list` exited nonzero.
    #[error("`go list` for package `{package}` exited with {status}")]
    Failed {
        /// The package being resolved.
        package: String,
        /// The exit status.
        status: ExitStatus,
    },

    /// `go list` succeeded but printed nothing usable.
    #[error("`go list` for package `{package}` produced no directory")]
    EmptyResult {
        /// The package being resolved.
        package: String,
    },
}
