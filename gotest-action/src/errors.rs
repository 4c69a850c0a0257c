// Copyright (c) The gotest-action Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use gotest_runner::errors::RunTestsError;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;

/// Documented exit codes for gotest-action.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum ActionExitCode {}

impl ActionExitCode {
    /// The run completed and every test passed.
    pub const OK: i32 = 0;

    /// A user issue happened while setting up the invocation (e.g. `go`
    /// could not be spawned).
    pub const SETUP_ERROR: i32 = 96;

    /// One or more tests failed, panicked, or errored.
    pub const TEST_RUN_FAILED: i32 = 100;

    /// `go test` exited nonzero without any test failing: a build error or
    /// tool crash.
    pub const INFRA_FAILURE: i32 = 102;
}

/// An error that occurred in something gotest-action ran or set up, not in
/// gotest-action itself.
#[derive(Debug, Error)]
pub enum ExpectedError {
    /// The test subprocess could not be driven to completion.
    #[error("failed to run tests")]
    RunTests {
        /// The underlying error.
        #[source]
        err: RunTestsError,
    },

    /// The async runtime could not be created.
    #[error("failed to set up the async runtime")]
    RuntimeSetup {
        /// The underlying error.
        #[source]
        err: std::io::Error,
    },
}

impl ExpectedError {
    /// The exit code the process should return for this error.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            ExpectedError::RunTests { .. } | ExpectedError::RuntimeSetup { .. } => {
                ActionExitCode::SETUP_ERROR
            }
        }
    }

    /// Displays this error and its cause chain to stderr.
    pub fn display_to_stderr(&self) {
        let mut next: Option<&dyn Error> = Some(self);
        let mut first = true;
        while let Some(error) = next {
            if first {
                eprintln!("{}: {error}", "error".red().bold());
                first = false;
            } else {
                eprintln!("{}: {error}", "caused by".yellow());
            }
            next = error.source();
        }
    }
}
